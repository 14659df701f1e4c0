use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("document '{0}' was not found")]
    NotFound(String),
    #[error("document '{0}' already exists")]
    Conflict(String),
    #[error("write was rejected by the store: {0}")]
    WriteRejected(String),
    #[error("couldn't parse store document: {0}")]
    CorruptedDocument(String),
    #[error("operation failed: {0}")]
    OperationFailed(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
