//! Dashboard aggregates over the row store.

use crate::models::{ReasonSet, RowRecord};
use crate::services::attachments::AttachmentRegistry;
use crate::services::derived::parse_amount;
use rust_decimal::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasonTotal {
    pub reason: String,
    pub total_value: Decimal,
}

/// Sum of each reason's `value` column.
///
/// Enumerated reasons come first in their configured order, zero when
/// unused; other reason labels follow in first-seen order. Untagged rows are
/// not counted.
pub fn reason_totals(rows: &[RowRecord], reasons: &ReasonSet) -> Vec<ReasonTotal> {
    let mut totals: Vec<ReasonTotal> = reasons
        .iter()
        .map(|r| ReasonTotal {
            reason: r.to_string(),
            total_value: Decimal::ZERO,
        })
        .collect();

    for row in rows {
        let reason = row.reasons.trim();
        if reason.is_empty() {
            continue;
        }
        let amount = parse_amount(&row.value);
        match totals.iter_mut().find(|t| t.reason == reason) {
            Some(total) => total.total_value = total.total_value.saturating_add(amount),
            None => totals.push(ReasonTotal {
                reason: reason.to_string(),
                total_value: amount,
            }),
        }
    }

    totals
}

/// Uploaded vs. not-uploaded amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadStatus {
    pub uploaded: Decimal,
    pub not_uploaded: Decimal,
    pub completion_percentage: u32,
}

impl UploadStatus {
    pub fn new(uploaded: Decimal, not_uploaded: Decimal) -> Self {
        let completion_percentage = uploaded
            .checked_add(not_uploaded)
            .filter(|total| !total.is_zero())
            .and_then(|total| uploaded.checked_div(total))
            .and_then(|share| share.checked_mul(Decimal::ONE_HUNDRED))
            .and_then(|pct| {
                pct.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                    .to_u32()
            })
            .unwrap_or(0);

        Self {
            uploaded,
            not_uploaded,
            completion_percentage,
        }
    }

    /// A row counts as uploaded once it has at least one attachment; the
    /// amount is its granted value.
    pub fn from_rows(rows: &[RowRecord], attachments: &AttachmentRegistry) -> Self {
        let (uploaded, not_uploaded) =
            rows.iter()
                .fold((Decimal::ZERO, Decimal::ZERO), |(up, pending), row| {
                    let amount = parse_amount(&row.granted_value);
                    if attachments.count(row.id) > 0 {
                        (up.saturating_add(amount), pending)
                    } else {
                        (up, pending.saturating_add(amount))
                    }
                });
        Self::new(uploaded, not_uploaded)
    }
}

/// Distinct buyer names in first-appearance order.
pub fn buyers(rows: &[RowRecord]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for row in rows {
        let name = row.buyer_name.trim();
        if !name.is_empty() && !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}
