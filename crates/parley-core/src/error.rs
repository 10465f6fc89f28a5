use parley_store::StoreError;
use thiserror::Error;

/// Failure categories of the domain core. The HTTP layer maps each variant to
/// exactly one status code.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Malformed input, unknown enum value, missing required field.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Caller is not a participant, not the sender, or the conversation kind
    /// does not allow the operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Connection or query failure. Never retried here.
    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => CoreError::NotFound("record not found".into()),
            other => CoreError::Store(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
