//! Shared types, config, and error definitions for the booking core.

pub mod config;
pub mod error;
pub mod spots;
pub mod store;
pub mod types;

pub use config::AppConfig;
pub use error::Error;
pub use spots::{spot, SpotCategory, SpotInfo, SpotPrice, EVENT_DATES, SPOTS, TRUNK_DATES};
pub use store::SheetStore;
pub use types::*;

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, Error>;
