//! # Error Types
//!
//! Custom error types for the sensor HAL using `thiserror`.
//!
//! Resolution misses and I/O failures are local conditions: callers treat a
//! missing device as "this sensor's data path is unavailable", never as a
//! reason to abort the process. A failed kernel name query on a scan candidate
//! is deliberately *not* an error at all — it reads as an empty device name,
//! which simply cannot match.

use thiserror::Error;

/// Main error type for the sensor HAL
#[derive(Debug, Error)]
pub enum SensorHalError {
    /// No input device in either the symlink tree or the raw input directory
    /// reports a matching kernel name
    #[error("couldn't find '{0}' input device")]
    DeviceNotFound(String),

    /// A flush request could not be delivered to the flush control file
    #[error("flush write failed for handle {handle}: {reason}")]
    Flush { handle: i32, reason: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the sensor HAL
pub type Result<T> = std::result::Result<T, SensorHalError>;
