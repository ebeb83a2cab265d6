//! Engine error types

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Seating engine error type
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Area not found: {0}")]
    AreaNotFound(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Not selectable: {0}")]
    NotSelectable(String),

    #[error("Sync engine has no query; call start() first")]
    NotStarted,

    #[error("Source error: {0}")]
    Source(#[from] AppError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Unified error code for the host UI
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::AreaNotFound(_) => ErrorCode::AreaNotFound,
            Self::TableNotFound(_) => ErrorCode::TableNotFound,
            Self::NotSelectable(_) => ErrorCode::TableNotSelectable,
            Self::NotStarted => ErrorCode::InvalidRequest,
            Self::Source(e) => e.code,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Io(_) => ErrorCode::InternalError,
        }
    }
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
