//! Miette report conversion for CLI errors.

use crate::error::CliError;
use miette::Report;

/// Convert a [`CliError`] into a `miette` report.
///
/// Pipeline errors already implement `Diagnostic` and are reported as-is so
/// their code and help text survive.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Pipeline(e) => Report::new(e),
        CliError::Config(e) => miette::miette!(code = "distpack::config", "{}", e),
        other => miette::miette!("{}", other),
    }
}
