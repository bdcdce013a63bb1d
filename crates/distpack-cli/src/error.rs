//! Error handling for the distpack CLI.
//!
//! - [`CliError`] is what commands return. Pipeline failures keep their
//!   [`distpack_pipeline::Error`] so the rendered report carries its
//!   diagnostic code and help.
//! - [`ConfigError`] covers loading and validating the layered configuration.

mod diagnostic;

use std::path::PathBuf;
use thiserror::Error;

pub use diagnostic::cli_error_to_miette;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A build step failed.
    #[error(transparent)]
    Pipeline(#[from] distpack_pipeline::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist
    #[error("Config file not found: {}\n\nHint: Create distpack.config.json in the project root or pass --config <path>", .0.display())]
    NotFound(PathBuf),

    /// Layered configuration could not be extracted
    #[error("Failed to load configuration: {0}\n\nHint: Check distpack.config.json and DISTPACK_* variables for unknown keys or wrong types")]
    Load(String),

    #[error("Missing required field: {field}\n\nHint: {hint}")]
    MissingField { field: String, hint: String },

    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        field: String,
        value: String,
        hint: String,
    },
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;
