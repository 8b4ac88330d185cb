//! Error types for configuration operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A stored flag value did not have the type the caller asked for.
    #[error("flag '{flag}' holds a {actual} value, expected {expected}")]
    FlagType {
        /// Flag name that was looked up.
        flag: String,
        /// Type requested by the caller.
        expected: &'static str,
        /// Type actually stored.
        actual: &'static str,
    },
    /// A stored string value could not be parsed as an integer.
    #[error("flag '{flag}' value '{value}' is not an integer")]
    InvalidInteger {
        /// Flag name that was looked up.
        flag: String,
        /// Offending raw value.
        value: String,
    },
    /// Profile field contained an invalid value.
    #[error("invalid value for '{field}' in profile: {message}")]
    InvalidField {
        /// Field that failed validation.
        field: &'static str,
        /// Human-readable error description.
        message: String,
    },
    /// Profile file was not valid JSON for the expected schema.
    #[error("failed to parse profile '{}'", path.display())]
    ProfileParse {
        /// File that failed to parse.
        path: PathBuf,
        /// Source JSON error.
        source: serde_json::Error,
    },
    /// File system operation failed.
    #[error("filesystem operation failed")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// File involved in the operation.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
