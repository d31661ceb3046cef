//! Error types for the focus_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for focus_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A duration setting outside its allowed range
    #[error("{field} must be between {min} and {max}, got {value}")]
    Validation {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    /// Unknown mode identifier
    #[error("Unknown mode: {0} (expected work, short-break or long-break)")]
    InvalidMode(String),

    /// Desktop notification could not be delivered
    #[error("Notification error: {0}")]
    Notification(String),

    /// Audio cue could not be played
    #[error("Audio error: {0}")]
    Audio(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
