//! Logging setup for the distpack CLI.
//!
//! Pipeline progress is emitted as `tracing` events by `distpack-pipeline`;
//! this module installs the subscriber that renders them.
//!
//! Levels, highest priority first:
//! 1. `--verbose`: DEBUG for the distpack crates
//! 2. `--quiet`: ERROR only
//! 3. `RUST_LOG`
//! 4. WARN, so a plain build shows drift warnings but not state changes

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const VERBOSE_FILTER: &str = "distpack=debug,distpack_cli=debug,distpack_pipeline=debug";
const QUIET_FILTER: &str = "distpack=error,distpack_cli=error,distpack_pipeline=error";
const DEFAULT_FILTER: &str = "distpack=warn,distpack_cli=warn,distpack_pipeline=warn";

/// Build the filter for the given flags.
pub fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Initialize the tracing subscriber. Call once, before any logging.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    init_logger_with_filter(filter_for(verbose, quiet), no_color);
}

/// Initialize with an explicit filter.
pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color && crate::ui::should_use_color())
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
