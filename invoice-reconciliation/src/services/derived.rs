//! Derived fields: `aging` and `difference`.

use crate::ingest::dates::parse_date;
use crate::models::CellValue;
use crate::services::metrics::record_recovered_cell;
use chrono::{Local, NaiveDate};
use rust_decimal::prelude::*;
use std::sync::Arc;

/// Source of "today" for aging.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local calendar date of the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock frozen on one day.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

pub type SharedClock = Arc<dyn Clock>;

/// Whole days between `today` and the granted date, as text.
///
/// Both ends are calendar days, so the count is exact and a grant dated today
/// ages `0`. Unparseable input ages to the empty string.
pub fn aging(granted_date: &CellValue, today: NaiveDate) -> String {
    if granted_date.is_empty() {
        return String::new();
    }
    match parse_date(granted_date) {
        Some(granted) => (today - granted).num_days().abs().to_string(),
        None => {
            tracing::debug!(input = %granted_date, "Granted date not parseable; aging left empty");
            record_recovered_cell("date");
            String::new()
        }
    }
}

/// Best-effort decimal read. Empty or malformed input reads as zero.
///
/// Thousands separators, surrounding whitespace and a leading currency sign
/// are tolerated.
pub fn parse_amount(input: &str) -> Decimal {
    let cleaned: String = input
        .trim()
        .trim_start_matches(['$', '₹', '€', '£'])
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return Decimal::ZERO;
    }

    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .unwrap_or_else(|_| {
            tracing::debug!(input = %input, "Amount not numeric; treated as zero");
            record_recovered_cell("number");
            Decimal::ZERO
        })
}

/// Format an amount with exactly two decimals, rounding half away from zero.
pub fn format_amount(amount: Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        rounded = Decimal::ZERO;
    }
    rounded.rescale(2);
    rounded.to_string()
}

/// `granted_value - lr_amount`, two decimals.
///
/// A result outside the decimal range reads as zero, like a malformed amount.
pub fn difference(granted_value: &str, lr_amount: &str) -> String {
    let amount = parse_amount(granted_value)
        .checked_sub(parse_amount(lr_amount))
        .unwrap_or_else(|| {
            tracing::debug!(granted_value, lr_amount, "Difference overflows; treated as zero");
            record_recovered_cell("number");
            Decimal::ZERO
        });
    format_amount(amount)
}
