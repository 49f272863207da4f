//! Workbook Reader seam.
//!
//! [`WorkbookReader`] is all ingestion needs from a spreadsheet library: the
//! sheet names and a per-sheet grid with a declared used range.
//! [`CalamineWorkbook`] backs it with calamine (xlsx, xlsm, xlsb, xls, ods);
//! [`MemoryWorkbook`] holds hand-built sheets.

use super::error::IngestError;
use crate::models::CellValue;
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use chrono::{NaiveDate, NaiveDateTime};
use std::io::Cursor;

static EMPTY_CELL: CellValue = CellValue::Empty;

/// Inclusive, zero-based bounds of the populated part of a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsedRange {
    pub first_row: u32,
    pub first_col: u32,
    pub last_row: u32,
    pub last_col: u32,
}

/// A loaded worksheet addressed by absolute `(row, column)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: String,
    origin: (u32, u32),
    rows: Vec<Vec<CellValue>>,
    /// Length of the longest row, fixed at construction.
    width: usize,
}

impl Sheet {
    /// Sheet whose first row and column are at `(0, 0)`.
    pub fn new(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self::with_origin(name, (0, 0), rows)
    }

    /// Sheet whose grid starts at `origin`; cells before it read as empty.
    pub fn with_origin(name: impl Into<String>, origin: (u32, u32), rows: Vec<Vec<CellValue>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        Self {
            name: name.into(),
            origin,
            rows,
            width,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn used_range(&self) -> Option<UsedRange> {
        let width = self.width;
        if self.rows.is_empty() || width == 0 {
            return None;
        }
        let (first_row, first_col) = self.origin;
        Some(UsedRange {
            first_row,
            first_col,
            last_row: first_row + self.rows.len() as u32 - 1,
            last_col: first_col + width as u32 - 1,
        })
    }

    pub fn cell(&self, row: u32, col: u32) -> &CellValue {
        let (first_row, first_col) = self.origin;
        if row < first_row || col < first_col {
            return &EMPTY_CELL;
        }
        self.rows
            .get((row - first_row) as usize)
            .and_then(|r| r.get((col - first_col) as usize))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Cells of `row` from column 0 through the last used column, so that
    /// slice indices equal absolute column numbers.
    pub fn row(&self, row: u32) -> Vec<CellValue> {
        if self.width == 0 {
            return Vec::new();
        }
        let (first_row, first_col) = self.origin;
        let mut cells = vec![CellValue::Empty; first_col as usize + self.width];
        if let Some(source) = row
            .checked_sub(first_row)
            .and_then(|r| self.rows.get(r as usize))
        {
            for (offset, cell) in source.iter().enumerate() {
                cells[first_col as usize + offset] = cell.clone();
            }
        }
        cells
    }
}

pub trait WorkbookReader {
    fn sheet_names(&self) -> Vec<String>;

    fn read_sheet(&mut self, name: &str) -> Result<Sheet, IngestError>;
}

// ============================================================================
// calamine-backed reader
// ============================================================================

pub struct CalamineWorkbook {
    inner: Sheets<Cursor<Vec<u8>>>,
}

impl CalamineWorkbook {
    /// Open a workbook from its raw bytes; the format is sniffed.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, IngestError> {
        if bytes.is_empty() {
            return Err(IngestError::ParseFailure("workbook is empty".to_string()));
        }
        let inner = open_workbook_auto_from_rs(Cursor::new(bytes))?;
        Ok(Self { inner })
    }
}

impl WorkbookReader for CalamineWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.inner.sheet_names()
    }

    fn read_sheet(&mut self, name: &str) -> Result<Sheet, IngestError> {
        if !self.inner.sheet_names().iter().any(|n| n == name) {
            return Err(IngestError::SheetNotFound(name.to_string()));
        }
        let range = self.inner.worksheet_range(name)?;
        Ok(sheet_from_range(name, &range))
    }
}

fn sheet_from_range(name: &str, range: &Range<Data>) -> Sheet {
    let origin = range.start().unwrap_or((0, 0));
    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect();
    Sheet::with_origin(name, origin, rows)
}

fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::text(if *b { "TRUE" } else { "FALSE" }),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(d) => CellValue::Date(d),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => parse_iso(s).map_or_else(|| CellValue::Text(s.clone()), CellValue::Date),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => {
            tracing::debug!(error = ?e, "Cell holds a formula error");
            CellValue::Empty
        }
    }
}

fn parse_iso(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

// ============================================================================
// In-memory reader
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbook {
    sheets: Vec<Sheet>,
}

impl MemoryWorkbook {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    pub fn with_sheet(mut self, sheet: Sheet) -> Self {
        self.sheets.push(sheet);
        self
    }
}

impl WorkbookReader for MemoryWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name().to_string()).collect()
    }

    fn read_sheet(&mut self, name: &str) -> Result<Sheet, IngestError> {
        self.sheets
            .iter()
            .find(|s| s.name() == name)
            .cloned()
            .ok_or_else(|| IngestError::SheetNotFound(name.to_string()))
    }
}
