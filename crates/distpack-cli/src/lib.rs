//! distpack CLI.
//!
//! Command-line front end for `distpack-pipeline`: it layers configuration
//! from defaults, `distpack.config.json`, `DISTPACK_*` variables and flags,
//! starts the bundler bridge command, and renders progress and the final
//! file listing.
//!
//! # Modules
//!
//! - [`cli`] - argument definitions
//! - `commands` - `build` and `plan`
//! - `config` - layered configuration
//! - [`error`] - error types and `miette` conversion
//! - [`logger`] - `tracing` subscriber setup
//! - [`ui`] - terminal output helpers

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{cli_error_to_miette, CliError, ConfigError, Result};
