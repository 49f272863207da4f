//! Mapping of source spreadsheet headers onto [`RowField`]s.

use crate::models::{CellValue, RowField};
use serde::{Deserialize, Serialize};

/// How a header cell is compared with a mapping's source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Header text equals the source text (surrounding whitespace ignored).
    #[default]
    Exact,
    /// Header text contains the source text, ignoring case.
    CaseInsensitiveContains,
}

impl MatchStrategy {
    pub fn matches(&self, header: &str, source: &str) -> bool {
        let header = header.trim();
        let source = source.trim();
        if source.is_empty() {
            return false;
        }
        match self {
            Self::Exact => header == source,
            Self::CaseInsensitiveContains => {
                header.to_lowercase().contains(&source.to_lowercase())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderMapping {
    pub source_header: String,
    pub target_field: RowField,
}

impl HeaderMapping {
    pub fn new(source_header: impl Into<String>, target_field: RowField) -> Self {
        Self {
            source_header: source_header.into(),
            target_field,
        }
    }
}

/// Ordered association of source header text to target field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderMap {
    #[serde(default)]
    pub strategy: MatchStrategy,
    pub mappings: Vec<HeaderMapping>,
}

/// A source column bound to the field it fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnBinding {
    pub column: usize,
    pub field: RowField,
}

impl HeaderMap {
    pub fn new(strategy: MatchStrategy, mappings: Vec<HeaderMapping>) -> Self {
        Self { strategy, mappings }
    }

    /// The captions of the reconciliation grid.
    pub fn standard() -> Self {
        Self::new(
            MatchStrategy::Exact,
            vec![
                HeaderMapping::new("Granted Date", RowField::GrantedDate),
                HeaderMapping::new("Buyer name", RowField::BuyerName),
                HeaderMapping::new("Invoice Number", RowField::InvoiceNumber),
                HeaderMapping::new("Granted Value", RowField::GrantedValue),
                HeaderMapping::new("LR Amount", RowField::LrAmount),
                HeaderMapping::new("Difference", RowField::Difference),
                HeaderMapping::new("Aging", RowField::Aging),
                HeaderMapping::new("Reason Category", RowField::ReasonCategory),
                HeaderMapping::new("Reasons", RowField::Reasons),
                HeaderMapping::new("Comments", RowField::Comments),
                HeaderMapping::new("Value", RowField::Value),
                HeaderMapping::new("Attachments", RowField::Attachments),
                HeaderMapping::new("Updated by", RowField::UpdatedBy),
                HeaderMapping::new("Updated on", RowField::UpdatedOn),
                HeaderMapping::new("Updated time", RowField::UpdatedTime),
            ],
        )
    }

    pub fn with_strategy(mut self, strategy: MatchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Field for a single header cell.
    ///
    /// When several mappings match (possible with the contains strategy),
    /// the longest source text wins, so "Granted Value" beats "Value".
    pub fn field_for(&self, header: &str) -> Option<RowField> {
        self.mappings
            .iter()
            .filter(|m| m.target_field != RowField::Id)
            .filter(|m| self.strategy.matches(header, &m.source_header))
            .fold(None::<&HeaderMapping>, |best, m| match best {
                Some(b) if b.source_header.trim().len() >= m.source_header.trim().len() => {
                    Some(b)
                }
                _ => Some(m),
            })
            .map(|m| m.target_field)
    }

    /// Bind header columns to fields. Unmapped columns are dropped; when two
    /// columns resolve to the same field the leftmost one keeps it.
    pub fn bind(&self, header_row: &[CellValue]) -> Vec<ColumnBinding> {
        let mut bindings: Vec<ColumnBinding> = Vec::new();
        for (column, cell) in header_row.iter().enumerate() {
            let header = cell.to_text();
            let Some(field) = self.field_for(&header) else {
                continue;
            };
            if bindings.iter().any(|b| b.field == field) {
                tracing::debug!(column, header = %header, field = field.as_str(), "Duplicate header ignored");
                continue;
            }
            bindings.push(ColumnBinding { column, field });
        }
        bindings
    }
}

impl Default for HeaderMap {
    fn default() -> Self {
        Self::standard()
    }
}

/// Cells of one data row keyed by field, in binding order.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedRow {
    pub cells: Vec<(RowField, CellValue)>,
}

impl MappedRow {
    pub fn get(&self, field: RowField) -> Option<&CellValue> {
        self.cells
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, cell)| cell)
    }
}

/// Pick the bound cells out of a data row.
///
/// Returns `None` when every mapped cell is empty: such a row is not an
/// invoice entry.
pub fn map_row(bindings: &[ColumnBinding], data_row: &[CellValue]) -> Option<MappedRow> {
    let cells: Vec<(RowField, CellValue)> = bindings
        .iter()
        .map(|b| {
            let cell = data_row.get(b.column).cloned().unwrap_or_default();
            (b.field, cell)
        })
        .collect();

    if cells.iter().all(|(_, cell)| cell.is_empty()) {
        return None;
    }

    Some(MappedRow { cells })
}
