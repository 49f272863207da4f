//! Domain models for invoice-reconciliation.

#![allow(clippy::should_implement_trait)]

pub mod cell;

pub use cell::CellValue;

use serde::{Deserialize, Serialize};

/// Row identifier, allocated by the row store and never reused in a session.
pub type RowId = u64;

// ============================================================================
// Row Fields
// ============================================================================

/// Every addressable column of a [`RowRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RowField {
    Id,
    GrantedDate,
    BuyerName,
    InvoiceNumber,
    GrantedValue,
    LrAmount,
    Difference,
    Aging,
    ReasonCategory,
    Reasons,
    Comments,
    Value,
    Attachments,
    UpdatedBy,
    UpdatedOn,
    UpdatedTime,
}

impl RowField {
    /// Text fields in grid order (everything except `id`).
    pub const EDITABLE: [RowField; 15] = [
        Self::GrantedDate,
        Self::BuyerName,
        Self::InvoiceNumber,
        Self::GrantedValue,
        Self::LrAmount,
        Self::Difference,
        Self::Aging,
        Self::ReasonCategory,
        Self::Reasons,
        Self::Comments,
        Self::Value,
        Self::Attachments,
        Self::UpdatedBy,
        Self::UpdatedOn,
        Self::UpdatedTime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::GrantedDate => "grantedDate",
            Self::BuyerName => "buyerName",
            Self::InvoiceNumber => "invoiceNumber",
            Self::GrantedValue => "grantedValue",
            Self::LrAmount => "lrAmount",
            Self::Difference => "difference",
            Self::Aging => "aging",
            Self::ReasonCategory => "reasonCategory",
            Self::Reasons => "reasons",
            Self::Comments => "comments",
            Self::Value => "value",
            Self::Attachments => "attachments",
            Self::UpdatedBy => "updatedBy",
            Self::UpdatedOn => "updatedOn",
            Self::UpdatedTime => "updatedTime",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "id" => Some(Self::Id),
            other => Self::EDITABLE.into_iter().find(|f| f.as_str() == other),
        }
    }

    /// Fields recomputed from other fields rather than taken as typed.
    pub fn is_derived(&self) -> bool {
        matches!(self, Self::Difference | Self::Aging)
    }
}

// ============================================================================
// Row Record
// ============================================================================

/// One reconciliation entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowRecord {
    pub id: RowId,
    pub granted_date: String,
    pub buyer_name: String,
    pub invoice_number: String,
    pub granted_value: String,
    pub lr_amount: String,
    pub difference: String,
    pub aging: String,
    pub reason_category: String,
    pub reasons: String,
    pub comments: String,
    pub value: String,
    pub attachments: String,
    pub updated_by: String,
    pub updated_on: String,
    pub updated_time: String,
}

impl RowRecord {
    /// A row with every field empty except `id`.
    pub fn blank(id: RowId) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Text value of a field; `None` for `id`, which is not text.
    pub fn get(&self, field: RowField) -> Option<&str> {
        let value = match field {
            RowField::Id => return None,
            RowField::GrantedDate => &self.granted_date,
            RowField::BuyerName => &self.buyer_name,
            RowField::InvoiceNumber => &self.invoice_number,
            RowField::GrantedValue => &self.granted_value,
            RowField::LrAmount => &self.lr_amount,
            RowField::Difference => &self.difference,
            RowField::Aging => &self.aging,
            RowField::ReasonCategory => &self.reason_category,
            RowField::Reasons => &self.reasons,
            RowField::Comments => &self.comments,
            RowField::Value => &self.value,
            RowField::Attachments => &self.attachments,
            RowField::UpdatedBy => &self.updated_by,
            RowField::UpdatedOn => &self.updated_on,
            RowField::UpdatedTime => &self.updated_time,
        };
        Some(value.as_str())
    }

    /// Set a text field. Returns `false` (and changes nothing) for `id`.
    pub fn set(&mut self, field: RowField, value: impl Into<String>) -> bool {
        let slot = match field {
            RowField::Id => return false,
            RowField::GrantedDate => &mut self.granted_date,
            RowField::BuyerName => &mut self.buyer_name,
            RowField::InvoiceNumber => &mut self.invoice_number,
            RowField::GrantedValue => &mut self.granted_value,
            RowField::LrAmount => &mut self.lr_amount,
            RowField::Difference => &mut self.difference,
            RowField::Aging => &mut self.aging,
            RowField::ReasonCategory => &mut self.reason_category,
            RowField::Reasons => &mut self.reasons,
            RowField::Comments => &mut self.comments,
            RowField::Value => &mut self.value,
            RowField::Attachments => &mut self.attachments,
            RowField::UpdatedBy => &mut self.updated_by,
            RowField::UpdatedOn => &mut self.updated_on,
            RowField::UpdatedTime => &mut self.updated_time,
        };
        *slot = value.into();
        true
    }

    pub fn is_blank(&self) -> bool {
        RowField::EDITABLE
            .iter()
            .all(|f| self.get(*f).is_none_or(str::is_empty))
    }
}

// ============================================================================
// Reasons
// ============================================================================

/// The enumerated discrepancy reasons offered to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReasonSet(Vec<String>);

impl ReasonSet {
    pub fn new<I, S>(reasons: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(reasons.into_iter().map(Into::into).collect())
    }

    pub fn standard() -> Self {
        Self::new([
            "R&Q",
            "ARU",
            "ARU & R&Q",
            "Rounding off",
            "Changes in Invoice reference",
            "Partial Granting",
        ])
    }

    pub fn contains(&self, reason: &str) -> bool {
        self.0.iter().any(|r| r == reason)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for ReasonSet {
    fn default() -> Self {
        Self::standard()
    }
}

// ============================================================================
// Roles
// ============================================================================

/// Role returned by the auth backend on login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    Admin,
    User,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
            Self::Other(s) => s,
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "admin" => Self::Admin,
            "user" => Self::User,
            other => Self::Other(other.to_string()),
        }
    }

    /// Where a freshly logged-in session lands.
    pub fn landing_route(&self) -> &'static str {
        match self {
            Self::Admin => "/admin",
            Self::User => "/dashboard",
            Self::Other(_) => "/",
        }
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_str(&s))
    }
}

impl Serialize for Role {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
