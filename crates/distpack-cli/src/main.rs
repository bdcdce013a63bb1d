//! distpack - staged multi-target bundle builds.
//!
//! Entry point: argument parsing, logging initialization and command
//! dispatch.

use clap::Parser;
use distpack_cli::{cli, commands, error, logger, ui};
use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors();

    let result = match args.command {
        cli::Command::Build(build_args) => commands::build_execute(build_args).await,
        cli::Command::Plan(plan_args) => commands::plan_execute(plan_args),
    };

    result.map_err(error::cli_error_to_miette)
}
