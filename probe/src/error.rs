//! Crate-level error type
//!
//! Discovery channels never surface these errors: their failures are captured
//! as data inside the report. This type covers the surfaces around the core,
//! such as fixture loading, configuration, logging setup and rendering.

use std::path::Path;

use thiserror::Error;

// Error message prefixes
const MSG_FAILED_TO_PREFIX: &str = "Failed to";
const MSG_INVALID_PREFIX: &str = "Invalid";

/// Result type for the `miniapp_wallet_probe` library
pub type Result<T> = std::result::Result<T, error_stack::Report<Error>>;

/// Error categories for the surfaces around the discovery core
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// File could not be read or written
    #[error("File operation failed: {0}")]
    FileOperation(String),

    /// Page fixture could not be parsed or built
    #[error("Fixture error: {0}")]
    Fixture(String),

    /// Caller supplied an invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Tracing subscriber could not be installed
    #[error("Log operation failed: {0}")]
    LogOperation(String),

    /// Snapshot could not be rendered
    #[error("Render failed: {0}")]
    Render(String),
}

impl Error {
    /// Create an "Invalid X" error
    pub fn invalid(what: &str, details: impl std::fmt::Display) -> Self {
        Self::InvalidArgument(format!("{MSG_INVALID_PREFIX} {what}: {details}"))
    }

    /// Create error for a tracing subscriber that could not be installed
    pub fn log_setup_failed(target: &str, details: impl std::fmt::Display) -> Self {
        Self::LogOperation(format!(
            "{MSG_FAILED_TO_PREFIX} install {target} subscriber: {details}"
        ))
    }

    /// Create error for IO operations
    pub fn io_failed(operation: &str, path: &Path, error: impl std::fmt::Display) -> Self {
        Self::FileOperation(format!(
            "{MSG_FAILED_TO_PREFIX} {operation} {}: {error}",
            path.display()
        ))
    }

    /// Create error for fixture parsing failures
    pub fn fixture_invalid(details: impl std::fmt::Display) -> Self {
        Self::Fixture(format!("{MSG_INVALID_PREFIX} page fixture: {details}"))
    }

    /// Create error for configuration values that do not parse
    pub fn config_invalid(key: &str, value: &str, details: impl std::fmt::Display) -> Self {
        Self::Configuration(format!(
            "{MSG_INVALID_PREFIX} value '{value}' for {key}: {details}"
        ))
    }
}
