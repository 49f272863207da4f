//! Prometheus metrics for invoice-reconciliation.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram, register_int_counter, CounterVec, Encoder,
    Histogram, IntCounter, TextEncoder,
};

/// Counter for workbook ingestions by outcome.
pub static INGESTIONS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "invoice_recon_ingestions_total",
        "Total number of workbook ingestions",
        &["status"]
    )
    .expect("Failed to register INGESTIONS")
});

/// Counter for rows produced by ingestion.
pub static ROWS_INGESTED: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "invoice_recon_rows_ingested_total",
        "Total number of rows produced by workbook ingestion"
    )
    .expect("Failed to register ROWS_INGESTED")
});

/// Histogram for ingestion duration.
pub static INGEST_DURATION: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "invoice_recon_ingest_duration_seconds",
        "Workbook ingestion duration in seconds",
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .expect("Failed to register INGEST_DURATION")
});

/// Counter for cells recovered locally (malformed dates and numbers).
pub static RECOVERED_CELLS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "invoice_recon_recovered_cells_total",
        "Total number of malformed cells recovered with a default",
        &["kind"]
    )
    .expect("Failed to register RECOVERED_CELLS")
});

/// Counter for auth contract requests.
pub static AUTH_REQUESTS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "invoice_recon_auth_requests_total",
        "Total number of auth backend requests",
        &["operation", "status"]
    )
    .expect("Failed to register AUTH_REQUESTS")
});

/// Counter for errors.
pub static ERRORS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "invoice_recon_errors_total",
        "Total number of errors",
        &["error_type"]
    )
    .expect("Failed to register ERRORS")
});

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&INGESTIONS);
    Lazy::force(&ROWS_INGESTED);
    Lazy::force(&INGEST_DURATION);
    Lazy::force(&RECOVERED_CELLS);
    Lazy::force(&AUTH_REQUESTS);
    Lazy::force(&ERRORS);
}

/// Get all metrics as Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Record an ingestion outcome and, on success, its row count.
pub fn record_ingestion(status: &str, rows: usize) {
    INGESTIONS.with_label_values(&[status]).inc();
    ROWS_INGESTED.inc_by(rows as u64);
}

/// Record a malformed cell that was defaulted.
pub fn record_recovered_cell(kind: &str) {
    RECOVERED_CELLS.with_label_values(&[kind]).inc();
}

/// Record an auth backend request.
pub fn record_auth_request(operation: &str, status: &str) {
    AUTH_REQUESTS.with_label_values(&[operation, status]).inc();
}

/// Record an error.
pub fn record_error(error_type: &str) {
    ERRORS.with_label_values(&[error_type]).inc();
}
