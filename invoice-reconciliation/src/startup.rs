//! Session wiring: configuration in, ready-to-use components out.

use crate::config::ReconciliationConfig;
use crate::ingest::{IngestReport, Importer};
use crate::models::ReasonSet;
use crate::services::{
    init_metrics, reason_totals, AuthClient, ReasonTotal, RowEvent, RowStore, SharedClock,
    SystemClock, UploadStatus,
};
use service_core::error::AppError;
use service_core::observability::init_tracing;
use std::sync::Arc;
use tracing::info;

/// Install tracing and register metrics. Call once per process.
pub fn init_observability(config: &ReconciliationConfig) -> Result<(), AppError> {
    init_tracing(
        &config.service_name,
        &config.common.log_level,
        config.common.otlp_endpoint.as_deref(),
    )?;
    init_metrics();

    info!(
        service_name = %config.service_name,
        version = %config.service_version,
        auth_base_url = %config.auth.base_url,
        auth_timeout_secs = config.auth.timeout.as_secs(),
        blank_rows = config.ingestion.blank_rows,
        "Configuration loaded"
    );
    Ok(())
}

/// What an upload installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSummary {
    pub sheet: String,
    pub header_row: u32,
    pub rows: usize,
    pub skipped: usize,
}

/// One user's working set: the row store, the importer configured for their
/// workbooks, and the auth backend client.
pub struct Session {
    config: ReconciliationConfig,
    importer: Importer,
    store: RowStore,
    auth: AuthClient,
}

impl Session {
    pub fn build(config: ReconciliationConfig) -> Result<Self, AppError> {
        Self::build_with_clock(config, Arc::new(SystemClock))
    }

    pub fn build_with_clock(
        config: ReconciliationConfig,
        clock: SharedClock,
    ) -> Result<Self, AppError> {
        let auth = AuthClient::new(&config.auth)?;
        let importer = Importer::from_config(&config.ingestion, clock.clone());
        Ok(Self {
            config,
            importer,
            store: RowStore::with_clock(clock),
            auth,
        })
    }

    pub fn config(&self) -> &ReconciliationConfig {
        &self.config
    }

    pub fn store(&self) -> &RowStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut RowStore {
        &mut self.store
    }

    pub fn auth(&self) -> &AuthClient {
        &self.auth
    }

    pub fn reasons(&self) -> &ReasonSet {
        &self.config.ingestion.reasons
    }

    /// Import a workbook and, only if it reads cleanly, replace the rows.
    pub async fn upload(&mut self, bytes: Vec<u8>) -> Result<UploadSummary, AppError> {
        let IngestReport {
            sheet,
            header_row,
            rows,
            skipped,
        } = self.importer.import_bytes(bytes).await?;

        let count = rows.len();
        self.store.replace_with_import(rows);
        info!(sheet = %sheet, rows = count, skipped, "Upload installed");
        Ok(UploadSummary {
            sheet,
            header_row,
            rows: count,
            skipped,
        })
    }

    /// Start over with the configured number of blank rows.
    pub fn new_blank_table(&mut self) -> Option<RowEvent> {
        self.store.create_blank_table(self.config.ingestion.blank_rows)
    }

    pub fn reason_totals(&self) -> Vec<ReasonTotal> {
        reason_totals(self.store.rows(), self.reasons())
    }

    pub fn upload_status(&self) -> UploadStatus {
        UploadStatus::from_rows(self.store.rows(), self.store.attachments())
    }
}
