use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("CONNECTION: {0}")]
    Connection(#[from] diesel::ConnectionError),
    #[error("SCHEMA: {0}")]
    Schema(String),
    #[error("STORAGE: {0}")]
    Storage(#[from] diesel::result::Error),
    #[error("IO_FAILURE: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Schema failures leave the store unusable; everything else is per call.
    pub fn is_fatal(&self) -> bool {
        matches!(self, StoreError::Schema(_) | StoreError::Connection(_))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
