//! Client error types

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Authentication required
    #[error("Authentication required")]
    Unauthorized,

    /// Permission denied
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Backend temporarily unreachable (502/503/504/408)
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Caller cancelled the request
    #[error("Request cancelled")]
    Cancelled,
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        let code = match &err {
            ClientError::Http(e) if e.is_timeout() => ErrorCode::TimeoutError,
            ClientError::Http(e) if e.is_decode() => ErrorCode::InvalidFormat,
            ClientError::Http(_) => ErrorCode::NetworkError,
            ClientError::InvalidResponse(_) | ClientError::Serialization(_) => ErrorCode::InvalidFormat,
            ClientError::Unauthorized => ErrorCode::NotAuthenticated,
            ClientError::Forbidden(_) => ErrorCode::PermissionDenied,
            ClientError::NotFound(_) => ErrorCode::NotFound,
            ClientError::Validation(_) => ErrorCode::ValidationFailed,
            ClientError::Unavailable(_) => ErrorCode::NetworkError,
            ClientError::Internal(_) => ErrorCode::InternalError,
            ClientError::Cancelled => ErrorCode::RequestCancelled,
        };
        let message = match err {
            ClientError::Forbidden(m)
            | ClientError::NotFound(m)
            | ClientError::Validation(m)
            | ClientError::Unavailable(m)
            | ClientError::Internal(m)
            | ClientError::InvalidResponse(m)
                if !m.is_empty() =>
            {
                m
            }
            ClientError::Unauthorized | ClientError::Cancelled => code.message().to_string(),
            other => other.to_string(),
        };
        AppError::with_message(code, message)
    }
}
