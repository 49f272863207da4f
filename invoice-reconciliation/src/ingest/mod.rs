//! Workbook ingestion: locate the header row, map columns, normalise dates,
//! derive `aging` and `difference`, and hand back complete rows.
//!
//! Ingestion never touches a [`RowStore`](crate::services::RowStore). The
//! caller installs the rows only once a whole workbook has been read, so a
//! failed import leaves the store as it was.

pub mod dates;
pub mod error;
pub mod schema;
pub mod workbook;

pub use error::IngestError;
pub use schema::{HeaderMap, HeaderMapping, MatchStrategy};
pub use workbook::{CalamineWorkbook, MemoryWorkbook, Sheet, UsedRange, WorkbookReader};

use crate::config::IngestionConfig;
use crate::models::{CellValue, RowField, RowId, RowRecord};
use crate::services::derived::{aging, difference, SharedClock};
use crate::services::metrics::{record_error, record_ingestion, INGEST_DURATION};
use chrono::NaiveDate;
use schema::{map_row, MappedRow};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// Which worksheet holds the data.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SheetSelector {
    /// The first sheet in workbook order.
    #[default]
    First,
    /// The first of these names the workbook has. Exact matches win over
    /// case-insensitive ones.
    Named { names: Vec<String> },
}

impl SheetSelector {
    pub fn select(&self, available: &[String]) -> Result<String, IngestError> {
        match self {
            Self::First => available
                .first()
                .cloned()
                .ok_or_else(|| IngestError::ParseFailure("workbook has no sheets".to_string())),
            Self::Named { names } => names
                .iter()
                .find_map(|wanted| available.iter().find(|a| *a == wanted))
                .or_else(|| {
                    names.iter().find_map(|wanted| {
                        available
                            .iter()
                            .find(|a| a.trim().eq_ignore_ascii_case(wanted.trim()))
                    })
                })
                .cloned()
                .ok_or_else(|| IngestError::SheetNotFound(names.join(", "))),
        }
    }
}

/// Where the header row is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HeaderRowLocator {
    /// A known zero-based sheet row.
    Fixed { row: u32 },
    /// The first row, within `max_rows` of the top of the used range, that
    /// binds at least `min_matches` columns.
    Search { max_rows: u32, min_matches: usize },
}

impl Default for HeaderRowLocator {
    fn default() -> Self {
        Self::Fixed { row: 0 }
    }
}

impl HeaderRowLocator {
    fn locate(&self, sheet: &Sheet, header_map: &HeaderMap) -> Option<u32> {
        let used = sheet.used_range()?;
        match self {
            Self::Fixed { row } => (used.first_row..=used.last_row).contains(row).then_some(*row),
            Self::Search { max_rows, min_matches } => {
                let last = used
                    .last_row
                    .min(used.first_row.saturating_add(max_rows.saturating_sub(1)));
                let needed = (*min_matches).max(1);
                (used.first_row..=last)
                    .find(|r| header_map.bind(&sheet.row(*r)).len() >= needed)
            }
        }
    }
}

/// Result of one successful import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub sheet: String,
    pub header_row: u32,
    pub rows: Vec<RowRecord>,
    /// Data rows dropped because none of their mapped cells had a value.
    pub skipped: usize,
}

#[derive(Clone)]
pub struct Importer {
    sheet: SheetSelector,
    header_row: HeaderRowLocator,
    header_map: HeaderMap,
    clock: SharedClock,
}

impl Importer {
    pub fn new(
        sheet: SheetSelector,
        header_row: HeaderRowLocator,
        header_map: HeaderMap,
        clock: SharedClock,
    ) -> Self {
        Self {
            sheet,
            header_row,
            header_map,
            clock,
        }
    }

    pub fn from_config(config: &IngestionConfig, clock: SharedClock) -> Self {
        Self::new(
            config.sheet.clone(),
            config.header_row.clone(),
            config.header_map.clone(),
            clock,
        )
    }

    pub fn header_map(&self) -> &HeaderMap {
        &self.header_map
    }

    /// Read rows out of an open workbook.
    #[instrument(skip_all)]
    pub fn import<W: WorkbookReader>(&self, workbook: &mut W) -> Result<IngestReport, IngestError> {
        let timer = INGEST_DURATION.start_timer();
        let result = self.read(workbook);
        timer.observe_duration();
        observe(result)
    }

    /// Parse raw workbook bytes on the blocking pool and import them.
    #[instrument(skip_all, fields(bytes = bytes.len()))]
    pub async fn import_bytes(&self, bytes: Vec<u8>) -> Result<IngestReport, IngestError> {
        let importer = self.clone();
        let timer = INGEST_DURATION.start_timer();
        let result = tokio::task::spawn_blocking(move || {
            let mut workbook = CalamineWorkbook::from_bytes(bytes)?;
            importer.read(&mut workbook)
        })
        .await
        .map_err(|e| IngestError::ParseFailure(format!("ingestion task failed: {}", e)))
        .and_then(|r| r);
        timer.observe_duration();
        observe(result)
    }

    fn read<W: WorkbookReader>(&self, workbook: &mut W) -> Result<IngestReport, IngestError> {
        let available = workbook.sheet_names();
        if available.is_empty() {
            return Err(IngestError::ParseFailure("workbook has no sheets".to_string()));
        }
        let sheet_name = self.sheet.select(&available)?;
        let sheet = workbook.read_sheet(&sheet_name)?;

        let header_row = self
            .header_row
            .locate(&sheet, &self.header_map)
            .ok_or_else(|| IngestError::HeaderNotFound {
                sheet: sheet_name.clone(),
            })?;
        let bindings = self.header_map.bind(&sheet.row(header_row));
        if bindings.is_empty() {
            warn!(sheet = %sheet_name, header_row, "Header row has no recognised columns");
        }

        let last_row = sheet.used_range().map_or(header_row, |r| r.last_row);
        let today = self.clock.today();
        let mut rows = Vec::new();
        let mut skipped = 0;
        for r in (header_row + 1)..=last_row {
            match map_row(&bindings, &sheet.row(r)) {
                Some(mapped) => {
                    let id = rows.len() as RowId + 1;
                    rows.push(build_record(id, &mapped, today));
                }
                None => skipped += 1,
            }
        }

        info!(sheet = %sheet_name, header_row, rows = rows.len(), skipped, "Workbook ingested");
        Ok(IngestReport {
            sheet: sheet_name,
            header_row,
            rows,
            skipped,
        })
    }
}

fn observe(result: Result<IngestReport, IngestError>) -> Result<IngestReport, IngestError> {
    match &result {
        Ok(report) => record_ingestion("success", report.rows.len()),
        Err(e) => {
            warn!(error = %e, "Workbook ingestion failed");
            record_ingestion("failure", 0);
            record_error(e.kind());
        }
    }
    result
}

/// Turn mapped cells into a full row with derived fields filled in.
fn build_record(id: RowId, mapped: &MappedRow, today: NaiveDate) -> RowRecord {
    let mut row = RowRecord::blank(id);
    for (field, cell) in &mapped.cells {
        let text = match field {
            RowField::GrantedDate => dates::normalize_date(cell),
            f if f.is_derived() => continue,
            _ => cell.to_text(),
        };
        row.set(*field, text);
    }

    let granted = mapped.get(RowField::GrantedDate).cloned().unwrap_or(CellValue::Empty);
    row.aging = aging(&granted, today);
    row.difference = difference(&row.granted_value, &row.lr_amount);
    row
}
