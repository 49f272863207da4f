use service_core::error::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to read workbook: {0}")]
    ParseFailure(String),

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    #[error("No data found in sheet '{sheet}'")]
    HeaderNotFound { sheet: String },
}

impl IngestError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ParseFailure(_) => "parse_failure",
            Self::SheetNotFound(_) => "sheet_not_found",
            Self::HeaderNotFound { .. } => "header_not_found",
        }
    }
}

impl From<calamine::Error> for IngestError {
    fn from(err: calamine::Error) -> Self {
        IngestError::ParseFailure(err.to_string())
    }
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        AppError::BadRequest(anyhow::Error::new(err))
    }
}
