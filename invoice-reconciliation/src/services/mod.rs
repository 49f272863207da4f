//! Services module for invoice-reconciliation.

pub mod attachments;
pub mod auth_client;
pub mod derived;
pub mod metrics;
pub mod row_store;
pub mod summary;

pub use attachments::{Attachment, AttachmentRegistry};
pub use auth_client::{AuthClient, AuthOutcome, AuthSession, LoginRequest, RegisterRequest};
pub use derived::{aging, difference, Clock, FixedClock, SharedClock, SystemClock};
pub use metrics::{get_metrics, init_metrics, record_error};
pub use row_store::{RowEvent, RowSnapshot, RowStore};
pub use summary::{buyers, reason_totals, ReasonTotal, UploadStatus};
