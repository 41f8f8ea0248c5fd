//! Unified error type for the booking core.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Sheet service error (status={status}): {message}")]
    Sheets { status: u16, message: String },

    #[error("Invalid response from sheet service: {0}")]
    InvalidResponse(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Validation failed:\n - {0}")]
    Validation(String),

    #[error("Duration already booked for {0}")]
    SlotTaken(String),

    #[error("Fun Run capacity exhausted")]
    CapacityFull,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}
