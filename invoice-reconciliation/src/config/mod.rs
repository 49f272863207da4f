//! Configuration module for invoice-reconciliation.

use crate::ingest::schema::HeaderMap;
use crate::ingest::{HeaderRowLocator, SheetSelector};
use crate::models::ReasonSet;
use config::{Config as Cfg, File};
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ReconciliationConfig {
    pub common: core_config::Config,
    pub service_name: String,
    pub service_version: String,
    pub auth: AuthConfig,
    pub ingestion: IngestionConfig,
}

/// External login/register backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// How uploaded workbooks are read.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IngestionConfig {
    #[serde(default)]
    pub sheet: SheetSelector,
    #[serde(default)]
    pub header_row: HeaderRowLocator,
    #[serde(default)]
    pub header_map: HeaderMap,
    #[serde(default)]
    pub reasons: ReasonSet,
    #[serde(default = "default_blank_rows")]
    pub blank_rows: usize,
}

fn default_blank_rows() -> usize {
    10
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            sheet: SheetSelector::default(),
            header_row: HeaderRowLocator::default(),
            header_map: HeaderMap::standard(),
            reasons: ReasonSet::standard(),
            blank_rows: default_blank_rows(),
        }
    }
}

impl IngestionConfig {
    /// Optional `reconciliation` file, then `RECON__*` environment variables.
    pub fn load() -> Result<Self, AppError> {
        let config = Cfg::builder()
            .add_source(File::with_name("reconciliation").required(false))
            .add_source(
                config::Environment::with_prefix("RECON")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

impl ReconciliationConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;

        let timeout_secs = match env::var("AUTH_API_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| {
                AppError::ConfigError(anyhow::anyhow!(
                    "AUTH_API_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                    raw
                ))
            })?,
            Err(_) => AuthConfig::default().timeout.as_secs(),
        };

        Ok(Self {
            common,
            service_name: env::var("SERVICE_NAME")
                .unwrap_or_else(|_| "invoice-reconciliation".to_string()),
            service_version: env::var("SERVICE_VERSION")
                .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string()),
            auth: AuthConfig {
                base_url: env::var("AUTH_API_BASE_URL")
                    .unwrap_or_else(|_| AuthConfig::default().base_url),
                timeout: Duration::from_secs(timeout_secs),
            },
            ingestion: IngestionConfig::load()?,
        })
    }
}
