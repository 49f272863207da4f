//! service-core: Shared infrastructure for the invoice reconciliation workspace.
pub mod config;
pub mod error;
pub mod observability;

pub use serde;
pub use serde_json;
pub use tokio;
pub use tracing;
pub use validator;
