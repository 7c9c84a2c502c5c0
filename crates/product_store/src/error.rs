use crate::record::RecordId;

/// Result type for product store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Product store specific errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("MongoDB error: {0}")]
    Driver(#[from] mongodb::error::Error),
    #[error("Record not found: {0}")]
    NotFound(RecordId),
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
    #[error("Write rejected for {id}: {reason}")]
    WriteRejected { id: RecordId, reason: String },
}
