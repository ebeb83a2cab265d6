//! Seat Client - HTTP client for the reservation backend
//!
//! Fetches floor plans, availability and arrival suggestions, books tables,
//! and plugs into `seat-engine` as its availability/suggestion source.

pub mod config;
pub mod error;
pub mod http;
mod sources;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;
