//! Plan command: list what a build would write without running one.

use crate::cli::PlanArgs;
use crate::commands::utils;
use crate::config::{ConfigOverrides, DistpackConfig};
use crate::error::Result;
use distpack_pipeline::ExpectedOutput;
use owo_colors::OwoColorize;

/// Execute the plan command.
///
/// Prints one line per expected file, or a JSON array with `--json`.
/// Optional files are only written when the bundler emits the matching
/// asset or a tree glob matches.
pub fn execute(args: PlanArgs) -> Result<()> {
    let root = utils::resolve_project_root(args.project.cwd.as_deref())?;

    let config = DistpackConfig::load(&args.project, &ConfigOverrides::default(), &root)?;
    config.validate()?;

    let expected = config.manifest().expected_outputs(&config.out_dir);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&expected)?);
    } else {
        for output in &expected {
            println!("{}", plan_line(output));
        }
    }

    Ok(())
}

fn plan_line(output: &ExpectedOutput) -> String {
    let path = output.path.display();
    if output.optional {
        format!("  {} {}", path, "(optional)".dimmed())
    } else {
        format!("  {path}")
    }
}
