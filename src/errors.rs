use thiserror::Error;

use crate::storage::BackendError;

/// Error type surfaced to callers of the services and the CLI.
#[derive(Debug, Error)]
pub enum OpsError {
    #[error("Ledger store unavailable: {0}")]
    Connectivity(String),
    #[error("Not permitted: {0}")]
    Unauthorized(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Persistence error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, OpsError>;

impl From<std::io::Error> for OpsError {
    fn from(err: std::io::Error) -> Self {
        OpsError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for OpsError {
    fn from(err: serde_json::Error) -> Self {
        OpsError::Config(err.to_string())
    }
}

impl From<BackendError> for OpsError {
    fn from(err: BackendError) -> Self {
        OpsError::Connectivity(err.to_string())
    }
}
