//! Build command implementation.
//!
//! Resolves the project, loads the layered configuration and drives a
//! [`BuildPipeline`] with the configured bundler bridge, showing per-target
//! progress on stderr and the written files on stdout.

use crate::cli::BuildArgs;
use crate::commands::utils;
use crate::config::{ConfigOverrides, DistpackConfig};
use crate::error::Result;
use crate::ui::{self, Spinner};
use distpack_pipeline::{
    BuildObserver, BuildPipeline, BuildReport, BuildTarget, Bundler, PipelineState,
    WrittenArtifact,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Execute the build command.
///
/// # Build Process
///
/// 1. Resolve the project root
/// 2. Load and validate configuration (CLI > Env > File > Defaults)
/// 3. Clean, bundle every target in order, copy helper files
/// 4. Print the written JavaScript files and the elapsed time
///
/// # Errors
///
/// Configuration problems, a missing bundler program, and the first failing
/// pipeline step.
pub async fn execute(args: BuildArgs) -> Result<()> {
    let start_time = Instant::now();

    let root = utils::resolve_project_root(args.project.cwd.as_deref())?;

    let config = DistpackConfig::load(&args.project, &ConfigOverrides::from(&args), &root)?;
    config.validate()?;

    let bundler = config.bundler(&root)?;
    ui::info(&format!(
        "Building {} targets into {}",
        config.manifest().targets.len(),
        config.out_dir.display()
    ));
    let report = run_with_bundler(&config, &root, Arc::new(bundler)).await?;

    ui::print_listing(&report.listing);
    ui::success(&format!(
        "Build completed in {}",
        ui::format_duration(start_time.elapsed())
    ));

    Ok(())
}

/// Run the pipeline described by `config` with an arbitrary bundler.
///
/// # Errors
///
/// The first failing pipeline step.
pub async fn run_with_bundler(
    config: &DistpackConfig,
    root: &Path,
    bundler: Arc<dyn Bundler>,
) -> Result<BuildReport> {
    let manifest = config.manifest();
    tracing::debug!(
        root = %root.display(),
        bundler = bundler.name(),
        targets = manifest.targets.len(),
        "starting build"
    );

    let progress = Arc::new(ProgressObserver::new());

    let pipeline = BuildPipeline::builder(manifest, bundler)
        .project_root(root)
        .settings(config.settings(root))
        .policy(config.integrity)
        .out_dir(&config.out_dir)
        .clean_dir(&config.clean_dir)
        .observer(progress.clone())
        .build();

    match pipeline.run().await {
        Ok(report) => {
            progress
                .spinner
                .finish(&format!("{} files written", report.written.len()));
            Ok(report)
        }
        Err(err) => {
            progress.spinner.fail("Build failed");
            Err(err.into())
        }
    }
}

/// Drives the spinner from pipeline events.
struct ProgressObserver {
    spinner: Spinner,
}

impl ProgressObserver {
    fn new() -> Self {
        let spinner = if ui::is_ci() {
            Spinner::hidden()
        } else {
            Spinner::new("Cleaning output...")
        };
        Self { spinner }
    }
}

impl BuildObserver for ProgressObserver {
    fn state_changed(&self, state: PipelineState) {
        match state {
            PipelineState::CopyingAuxiliary => self.spinner.set_message("Copying helper files..."),
            PipelineState::Reporting => self.spinner.set_message("Collecting output..."),
            _ => {}
        }
    }

    fn target_started(&self, index: usize, total: usize, target: &BuildTarget) {
        self.spinner
            .set_message(&format!("[{index}/{total}] Building {}", target.name));
    }

    fn target_finished(&self, target: &BuildTarget, written: &[WrittenArtifact]) {
        tracing::debug!(build = %target.name, files = written.len(), "target written");
    }
}
