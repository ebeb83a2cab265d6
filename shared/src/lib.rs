//! Shared types for the venue seating engine
//!
//! Data models exchanged with the reservation backend and the unified
//! error types used by the engine and the HTTP client.

pub mod error;
pub mod models;

// Re-exports
pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use serde::{Deserialize, Serialize};
