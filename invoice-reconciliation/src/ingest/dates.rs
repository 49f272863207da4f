//! Date normalisation for spreadsheet cells.
//!
//! Spreadsheets store dates as day counts from the 1900 epoch, where day 1 is
//! 1 January 1900 and day 60 is the non-existent 29 February 1900 that the
//! format inherited for compatibility. Every serial past 60 is therefore one
//! day ahead of plain epoch arithmetic.

use crate::models::CellValue;
use crate::services::metrics::record_recovered_cell;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};

/// Phantom leap day in the 1900 date system.
const PHANTOM_LEAP_SERIAL: i64 = 60;

/// 31 December 9999, the last representable spreadsheet date.
const MAX_SERIAL: f64 = 2_958_465.0;

const ISO_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

const ISO_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const NAMED_MONTH_FORMATS: &[&str] = &[
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%d-%b-%Y",
    "%d-%B-%Y",
];

/// Convert a day-count serial into a calendar date.
///
/// The fractional part (time of day) is dropped. Serials below 1 or past
/// 31 December 9999 have no date.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(1.0..=MAX_SERIAL).contains(&serial) {
        return None;
    }

    let days = serial.floor() as i64;
    let (base, offset) = match days.cmp(&PHANTOM_LEAP_SERIAL) {
        std::cmp::Ordering::Less => (NaiveDate::from_ymd_opt(1899, 12, 31)?, days),
        // There is no 29 February 1900; clamp onto the last real February day.
        std::cmp::Ordering::Equal => return NaiveDate::from_ymd_opt(1900, 2, 28),
        std::cmp::Ordering::Greater => (NaiveDate::from_ymd_opt(1899, 12, 30)?, days),
    };

    base.checked_add_signed(Duration::days(offset))
}

/// Try to read a free-text date.
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in ISO_DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in ISO_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Some(d) = parse_month_first(s) {
        return Some(d);
    }
    for fmt in NAMED_MONTH_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    None
}

/// `month/day/year` with `/`, `-` or `.` separators; two-digit years below 50
/// land in the 2000s, the rest in the 1900s.
fn parse_month_first(s: &str) -> Option<NaiveDate> {
    let sep = ['/', '-', '.'].into_iter().find(|c| s.contains(*c))?;
    let parts: Vec<&str> = s.split(sep).map(str::trim).collect();
    let [month, day, year] = parts.as_slice() else {
        return None;
    };
    if month.len() > 2 || day.len() > 2 || !(year.len() == 2 || year.len() == 4) {
        return None;
    }

    let month: u32 = month.parse().ok()?;
    let day: u32 = day.parse().ok()?;
    let mut year: i32 = year.parse().ok()?;
    if year < 100 {
        year += if year < 50 { 2000 } else { 1900 };
    }

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Interpret a cell as a calendar date, if it is one.
pub fn parse_date(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::Empty => None,
        CellValue::Number(n) => serial_to_date(*n),
        CellValue::Date(dt) => Some(dt.date()),
        CellValue::Text(s) => match s.trim().parse::<f64>() {
            Ok(n) => serial_to_date(n),
            Err(_) => parse_date_text(s),
        },
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

/// Normalise a cell into `month/day/year` text.
///
/// Unrecognised free text is kept as typed; serials with no calendar date
/// become the empty string.
pub fn normalize_date(value: &CellValue) -> String {
    match value {
        CellValue::Empty => String::new(),
        CellValue::Date(dt) => format_date(dt.date()),
        CellValue::Number(n) => match serial_to_date(*n) {
            Some(d) => format_date(d),
            None => {
                tracing::debug!(serial = *n, "Date serial out of range");
                record_recovered_cell("date");
                String::new()
            }
        },
        CellValue::Text(s) => {
            let trimmed = s.trim();
            if let Ok(n) = trimmed.parse::<f64>() {
                return normalize_date(&CellValue::Number(n));
            }
            match parse_date_text(trimmed) {
                Some(d) => format_date(d),
                None => trimmed.to_string(),
            }
        }
    }
}
