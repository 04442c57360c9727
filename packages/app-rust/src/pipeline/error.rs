use crate::ai::AiError;
use crate::storage::StoreError;

/// Faults raised by handlers or by the work they delegate to.
///
/// An authorization denial is not a fault: it is a short-circuit with
/// `handled` set, and never surfaces as a `HandlerError`.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("validation failed: {}", .errors.join("; "))]
    Validation { errors: Vec<String> },
    #[error("{request_kind} expected a {expected} payload")]
    Payload {
        request_kind: String,
        expected: &'static str,
    },
    #[error("operation timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    #[error("operation cancelled")]
    Cancelled,
    #[error("handler panicked: {message}")]
    Panicked { message: String },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Ai(#[from] AiError),
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
