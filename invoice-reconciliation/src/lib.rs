//! Invoice reconciliation - granted value vs. LR amount tracking.
//!
//! Workbook ingestion normalises uploaded spreadsheets into [`models::RowRecord`]s,
//! which live in an editable [`services::RowStore`] alongside their attachments.

pub mod config;
pub mod ingest;
pub mod models;
pub mod services;
pub mod startup;
