use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Concurrency conflict: {0}")]
    ConcurrencyConflict(String),
    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Internal error: {0}")]
    InternalError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl LedgerError {
    /// Whether the orchestration layer may retry the failed operation.
    ///
    /// Business-rule rejections are final; only contention and collaborator
    /// I/O failures are worth another attempt.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LedgerError::ConcurrencyConflict(_) | LedgerError::PersistenceUnavailable(_)
        )
    }

    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        LedgerError::NotFound(format!("{entity} {id}"))
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for LedgerError {
    fn from(err: rocksdb::Error) -> Self {
        LedgerError::PersistenceUnavailable(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
