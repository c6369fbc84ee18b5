use thiserror::Error;

/// Error type that captures common ledger and schedule failures.
#[derive(Debug, Error)]
pub enum BudgetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Invalid reference: {0}")]
    InvalidRef(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Ledger schema version {0} is newer than this build supports")]
    UnsupportedSchema(u8),
}
