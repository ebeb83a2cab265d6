//! Seat Engine - interactive venue map for table reservations
//!
//! Normalizes raw floor plans into percentage space, drives the pan/zoom
//! transform from gestures, keeps table availability in sync with the
//! backend and runs the arrival-location suggestion search.

pub mod config;
pub mod error;
pub mod gate;
pub mod geometry;
pub mod layout;
pub mod logging;
pub mod search;
pub mod source;
pub mod status;
pub mod sync;
pub mod viewport;

pub use config::{EngineConfig, LoggingConfig, SearchConfig, SyncConfig, ViewportConfig};
pub use error::{EngineError, EngineResult};
pub use gate::{RequestGate, Ticket};
pub use geometry::{NormalizedArea, normalize, normalize_floorplan};
pub use layout::{TableView, VenueLayout};
pub use logging::init_logging;
pub use search::{SearchError, SuggestionDisplay, SuggestionQueryState, SuggestionSearchEngine};
pub use source::{AvailabilitySource, SuggestionSource};
pub use status::{TableStatus, resolve};
pub use sync::{AvailabilityState, AvailabilitySyncEngine, RefreshMode, SyncAlert};
pub use viewport::{Transform, ViewportController};
