//! Data models
//!
//! Shared between the seating engine and the HTTP client.
//! Field names follow the backend's snake_case JSON.

pub mod availability;
pub mod reservation;
pub mod suggestion;
pub mod venue;

// Re-exports
pub use availability::*;
pub use reservation::*;
pub use suggestion::*;
pub use venue::*;
