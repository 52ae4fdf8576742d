//! Error types for UnitKo Core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("External call failed: {0}")]
    ExternalCallFailed(String),

    #[error("Inconsistent state: {0}")]
    InconsistentState(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse classification surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Entity absent
    NotFound,
    /// Caller input rejected
    ValidationFailed,
    /// A collaborator returned an error
    ExternalCallFailed,
    /// A multi-step workflow failed after an irreversible step
    InconsistentState,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::ValidationFailed(_) | Error::Config(_) => ErrorKind::ValidationFailed,
            Error::InconsistentState(_) => ErrorKind::InconsistentState,
            Error::Database(_)
            | Error::Authentication(_)
            | Error::ExternalCallFailed(_)
            | Error::Io(_)
            | Error::Serialization(_) => ErrorKind::ExternalCallFailed,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
