use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(anyhow::Error),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Bad Gateway: {0}")]
    BadGateway(String),

    #[error("Gateway timeout: {0}")]
    GatewayTimeout(String),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::GatewayTimeout(err.to_string())
        } else {
            AppError::BadGateway(err.to_string())
        }
    }
}

/// JSON-friendly view of an error, for callers that surface failures to a UI.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ErrorReport {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AppError {
    /// Short machine-stable label, used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation",
            AppError::BadRequest(_) => "bad_request",
            AppError::InternalError(_) => "internal",
            AppError::BadGateway(_) => "bad_gateway",
            AppError::GatewayTimeout(_) => "gateway_timeout",
            AppError::ConfigError(_) => "config",
        }
    }

    pub fn report(&self) -> ErrorReport {
        let (error, details) = match self {
            AppError::ValidationError(err) => {
                ("Validation error".to_string(), Some(err.to_string()))
            }
            AppError::BadRequest(err) => (err.to_string(), None),
            AppError::InternalError(err) => {
                ("Internal error".to_string(), Some(format!("{:#}", err)))
            }
            AppError::BadGateway(msg) => (format!("Bad Gateway: {}", msg), None),
            AppError::GatewayTimeout(msg) => (format!("Gateway timeout: {}", msg), None),
            AppError::ConfigError(err) => {
                ("Configuration error".to_string(), Some(err.to_string()))
            }
        };

        ErrorReport { error, details }
    }
}
