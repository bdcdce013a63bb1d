//! Command-line interface definition for distpack.
//!
//! # Command Structure
//!
//! - `distpack build` - clean, bundle every target and stage the output tree
//! - `distpack plan` - list the files a build would write

mod commands;

use clap::Parser;

pub use commands::{BuildArgs, Command, PlanArgs, ProjectArgs};

/// distpack - staged multi-target bundle builds
#[derive(Parser, Debug)]
#[command(
    name = "distpack",
    version,
    about = "Build a multi-entry bundle distribution",
    long_about = "distpack drives a bundler once per declared target, checks the assets each\n\
                  target emits against an allowlist, and stages code, compile caches and helper\n\
                  files into the distribution directory."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    ///
    /// Shows bundler invocations, per-target configuration and every file
    /// written.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
