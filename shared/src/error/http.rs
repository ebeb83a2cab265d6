//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            Self::NotFound | Self::TableNotFound | Self::AreaNotFound | Self::VenueNotFound => {
                StatusCode::NOT_FOUND
            }

            Self::NotAuthenticated | Self::TokenExpired => StatusCode::UNAUTHORIZED,

            Self::PermissionDenied | Self::LocationPermissionDenied => StatusCode::FORBIDDEN,

            Self::ValidationFailed | Self::TableNotSelectable => StatusCode::UNPROCESSABLE_ENTITY,

            Self::NetworkError | Self::TimeoutError => StatusCode::SERVICE_UNAVAILABLE,

            Self::InternalError | Self::ConfigError | Self::Unknown => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            // 400 Bad Request (default for malformed input / cancelled calls)
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Map an HTTP status returned by the backend onto an error code
    pub fn from_http_status(status: StatusCode) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => Self::NotAuthenticated,
            StatusCode::FORBIDDEN => Self::PermissionDenied,
            StatusCode::NOT_FOUND => Self::NotFound,
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Self::ValidationFailed,
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => Self::TimeoutError,
            StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => Self::NetworkError,
            _ => Self::InternalError,
        }
    }
}
