//! Typed spreadsheet cell values at the ingestion boundary.

use chrono::NaiveDateTime;
use std::fmt;

/// A single cell as the workbook reader hands it over.
///
/// Numbers that carry a date number-format arrive as [`CellValue::Date`];
/// bare day-count serials stay [`CellValue::Number`] and are interpreted by
/// the date normaliser.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Date(NaiveDateTime),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Empty cells and whitespace-only text count as empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(n) => n.is_nan(),
            Self::Date(_) => false,
        }
    }

    /// Display text for free-text fields.
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Number(n) if n.is_nan() => Ok(()),
            // f64's Display already drops a trailing ".0".
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s.trim()),
            Self::Date(dt) => write!(f, "{}", dt.format("%-m/%-d/%Y")),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}
