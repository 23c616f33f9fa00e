//! Error types for datawire.

use thiserror::Error;

/// Result type alias for datawire operations.
pub type Result<T> = std::result::Result<T, DataWireError>;

/// Errors raised when parsing or validating core values.
#[derive(Error, Debug)]
pub enum DataWireError {
    /// Unknown transfer direction.
    #[error("Unknown direction: {0} (expected 'upload' or 'download')")]
    InvalidDirection(String),

    /// A day key could not be parsed.
    #[error("Invalid day key '{value}': {source}")]
    InvalidDay {
        /// The rejected input.
        value: String,
        /// The underlying chrono error.
        source: chrono::ParseError,
    },

    /// A UTC offset outside of +/- 24 hours.
    #[error("Invalid UTC offset: {0} minutes")]
    InvalidOffset(i32),

    /// A setting value was rejected.
    #[error("Invalid setting {name}: {reason}")]
    InvalidSetting {
        /// Name of the setting.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}
