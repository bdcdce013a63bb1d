use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Available distpack subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the distribution
    ///
    /// Removes stale artifacts, bundles every target in order, and writes
    /// code, compile caches, license files and helper copies. The first
    /// failing target aborts the build.
    Build(BuildArgs),

    /// Print the files a build would write, without building
    Plan(PlanArgs),
}

/// Options shared by every command that reads the project configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Path to the configuration file
    ///
    /// Defaults to distpack.config.json in the project root, if present.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Project root
    ///
    /// Defaults to the nearest directory containing a package.json, walking
    /// up from the current directory.
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,
}

/// Arguments for the build command
#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Disable minification for all targets
    #[arg(long)]
    pub no_minify: bool,

    /// Disable compiled-code caching for all targets
    ///
    /// No `.cache` / `.cache.js` companions will be emitted.
    #[arg(long)]
    pub no_v8cache: bool,

    /// Do not pass an on-disk cache directory to the bundler
    #[arg(long)]
    pub no_cache: bool,

    /// Disable the bundler's optional source-rewrite pass
    #[arg(long)]
    pub no_babel: bool,

    /// Fail the build when a target emits assets outside its allowlist
    ///
    /// By default such assets are reported as warnings and the build
    /// continues.
    #[arg(long)]
    pub strict_assets: bool,
}

/// Arguments for the plan command
#[derive(Args, Debug, Clone, Default)]
pub struct PlanArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,
}
