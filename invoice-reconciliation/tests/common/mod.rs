//! Common test utilities for invoice-reconciliation integration tests.
#![allow(dead_code)]

use chrono::NaiveDate;
use invoice_reconciliation::services::{FixedClock, SharedClock};
use rust_xlsxwriter::{Format, Workbook};
use std::sync::{Arc, Once};

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,invoice_reconciliation=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// The "today" every test ages against.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 6, 28).unwrap()
}

pub fn clock() -> SharedClock {
    Arc::new(FixedClock(today()))
}

/// A fixture cell.
#[derive(Debug, Clone)]
pub enum Cell {
    Text(&'static str),
    Number(f64),
    /// A serial written with a date number format, so readers see a date.
    Date(f64),
    Blank,
}

pub use Cell::{Blank, Date, Number, Text};

pub const STANDARD_HEADER: [&str; 5] = [
    "Granted Date",
    "Buyer name",
    "Invoice Number",
    "Granted Value",
    "LR Amount",
];

pub fn header(captions: &[&'static str]) -> Vec<Cell> {
    captions.iter().map(|c| Text(*c)).collect()
}

/// Build an `.xlsx` in memory with one worksheet per entry.
pub fn xlsx(sheets: &[(&str, Vec<Vec<Cell>>)]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("m/d/yyyy");

    for (name, rows) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*name).expect("valid sheet name");
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let (r, c) = (r as u32, c as u16);
                match cell {
                    Text(s) => {
                        worksheet.write_string(r, c, *s).expect("write string");
                    }
                    Number(n) => {
                        worksheet.write_number(r, c, *n).expect("write number");
                    }
                    Date(n) => {
                        worksheet
                            .write_number_with_format(r, c, *n, &date_format)
                            .expect("write date");
                    }
                    Blank => {}
                }
            }
        }
    }

    workbook.save_to_buffer().expect("Failed to build fixture workbook")
}
