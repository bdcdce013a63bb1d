//! The build driver.
//!
//! A run walks a fixed sequence of states:
//!
//! ```text
//! Clean -> Building(1) -> ... -> Building(N) -> CopyingAuxiliary -> Reporting -> Done
//!   \__________________________________________________________________/
//!                                 |
//!                               Failed
//! ```
//!
//! Targets are bundled strictly in manifest order and each one's artifacts
//! are written before the next target is invoked. The first error stops the
//! run: no later target is bundled and nothing further is written.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use path_clean::PathClean;
use tracing::{error, info};

use crate::cleaner::OutputCleaner;
use crate::config::BuildSettings;
use crate::copier::AuxiliaryAssetCopier;
use crate::integrity::{IntegrityPolicy, IntegrityReport};
use crate::invoker::{BundleInvoker, Bundler};
use crate::manifest::BuildManifest;
use crate::target::BuildTarget;
use crate::writer::{ArtifactSpec, ArtifactWriter, WrittenArtifact};
use crate::{Error, Result};

/// Default directory cleaned before a build, relative to the project root.
pub const DEFAULT_CLEAN_DIR: &str = "dist";
/// Default output directory, relative to the project root.
pub const DEFAULT_OUT_DIR: &str = "dist/ncc";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Clean,
    /// Bundling the target at this 1-based position.
    Building(usize),
    CopyingAuxiliary,
    Reporting,
    Done,
    Failed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Clean => f.write_str("clean"),
            PipelineState::Building(i) => write!(f, "building({i})"),
            PipelineState::CopyingAuxiliary => f.write_str("copying-auxiliary"),
            PipelineState::Reporting => f.write_str("reporting"),
            PipelineState::Done => f.write_str("done"),
            PipelineState::Failed => f.write_str("failed"),
        }
    }
}

/// Progress hooks for front ends. Every method defaults to doing nothing.
pub trait BuildObserver: Send + Sync {
    fn state_changed(&self, _state: PipelineState) {}

    fn target_started(&self, _index: usize, _total: usize, _target: &BuildTarget) {}

    fn target_finished(&self, _target: &BuildTarget, _written: &[WrittenArtifact]) {}

    fn integrity_drift(&self, _report: &IntegrityReport) {}
}

struct NoopObserver;

impl BuildObserver for NoopObserver {}

/// A written JavaScript file, for the end-of-build listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// Relative to the project root.
    pub path: PathBuf,
    pub size: u64,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// States visited, in order, ending with [`PipelineState::Done`].
    pub states: Vec<PipelineState>,
    /// Every file written, in write order.
    pub written: Vec<WrittenArtifact>,
    /// Targets that emitted assets outside their allowlist.
    pub integrity: Vec<IntegrityReport>,
    /// Written `.js` files sorted by path.
    pub listing: Vec<ListingEntry>,
}

pub struct BuildPipeline {
    manifest: BuildManifest,
    bundler: Arc<dyn Bundler>,
    project_root: PathBuf,
    settings: BuildSettings,
    policy: IntegrityPolicy,
    out_dir: PathBuf,
    clean_dir: PathBuf,
    observer: Arc<dyn BuildObserver>,
}

impl fmt::Debug for BuildPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildPipeline")
            .field("targets", &self.manifest.targets.len())
            .field("bundler", &self.bundler.name())
            .field("project_root", &self.project_root)
            .field("settings", &self.settings)
            .field("policy", &self.policy)
            .field("out_dir", &self.out_dir)
            .field("clean_dir", &self.clean_dir)
            .finish()
    }
}

/// Builder for [`BuildPipeline`].
pub struct BuildPipelineBuilder {
    pipeline: BuildPipeline,
}

impl BuildPipelineBuilder {
    pub fn project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.pipeline.project_root = root.into();
        self
    }

    pub fn settings(mut self, settings: BuildSettings) -> Self {
        self.pipeline.settings = settings;
        self
    }

    pub fn policy(mut self, policy: IntegrityPolicy) -> Self {
        self.pipeline.policy = policy;
        self
    }

    /// Output directory, relative to the project root.
    pub fn out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.pipeline.out_dir = dir.into();
        self
    }

    /// Directory swept by the clean step, relative to the project root.
    pub fn clean_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.pipeline.clean_dir = dir.into();
        self
    }

    pub fn observer(mut self, observer: Arc<dyn BuildObserver>) -> Self {
        self.pipeline.observer = observer;
        self
    }

    pub fn build(self) -> BuildPipeline {
        self.pipeline
    }
}

impl BuildPipeline {
    pub fn builder(manifest: BuildManifest, bundler: Arc<dyn Bundler>) -> BuildPipelineBuilder {
        BuildPipelineBuilder {
            pipeline: BuildPipeline {
                manifest,
                bundler,
                project_root: PathBuf::from("."),
                settings: BuildSettings::default(),
                policy: IntegrityPolicy::default(),
                out_dir: PathBuf::from(DEFAULT_OUT_DIR),
                clean_dir: PathBuf::from(DEFAULT_CLEAN_DIR),
                observer: Arc::new(NoopObserver),
            },
        }
    }

    pub fn manifest(&self) -> &BuildManifest {
        &self.manifest
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Execute the build.
    ///
    /// # Errors
    ///
    /// The first failure of any step. Files written before it stay on disk;
    /// the next run's clean step removes them.
    pub async fn run(&self) -> Result<BuildReport> {
        let mut report = BuildReport::default();

        match self.run_steps(&mut report).await {
            Ok(()) => {
                self.enter(&mut report, PipelineState::Done);
                info!(
                    targets = self.manifest.targets.len(),
                    files = report.written.len(),
                    "build finished"
                );
                Ok(report)
            }
            Err(err) => {
                self.enter(&mut report, PipelineState::Failed);
                error!(error = %err, "build failed");
                Err(err)
            }
        }
    }

    async fn run_steps(&self, report: &mut BuildReport) -> Result<()> {
        self.manifest.validate()?;
        check_dir(&self.clean_dir, "clean directory")?;
        check_dir(&self.out_dir, "output directory")?;

        self.enter(report, PipelineState::Clean);
        OutputCleaner::new(self.project_root.join(&self.clean_dir)).clean()?;

        let writer = ArtifactWriter::new(&self.project_root);
        let invoker = BundleInvoker::new(
            Arc::clone(&self.bundler),
            self.settings.clone(),
            &self.project_root,
        );

        let total = self.manifest.targets.len();
        for (i, target) in self.manifest.targets.iter().enumerate() {
            self.enter(report, PipelineState::Building(i + 1));
            self.observer.target_started(i + 1, total, target);

            let written = self.build_target(&invoker, &writer, target, report).await?;

            self.observer.target_finished(target, &written);
            report.written.extend(written);
        }

        self.enter(report, PipelineState::CopyingAuxiliary);
        let copier = AuxiliaryAssetCopier::new(writer.clone());
        for file in &self.manifest.verbatim {
            let written = copier.copy_file(&file.source, &self.out_dir.join(&file.to))?;
            report.written.push(written);
        }
        for tree in &self.manifest.trees {
            let written = copier.copy_tree(&tree.pattern, &self.out_dir.join(&tree.to))?;
            report.written.extend(written);
        }

        self.enter(report, PipelineState::Reporting);
        report.listing = listing(writer.root(), &self.out_dir, &report.written);

        Ok(())
    }

    /// Bundle one target, check its assets and write what it produced.
    async fn build_target(
        &self,
        invoker: &BundleInvoker,
        writer: &ArtifactWriter,
        target: &BuildTarget,
        report: &mut BuildReport,
    ) -> Result<Vec<WrittenArtifact>> {
        let result = invoker.invoke(target).await?;

        if let Some(drift) = IntegrityReport::check(target, &result) {
            self.observer.integrity_drift(&drift);
            self.policy.enforce(&drift)?;
            report.integrity.push(drift);
        }

        let mut written = Vec::new();

        let code = ArtifactSpec::new(self.out_dir.join(&target.output), Some(&result.code))
            .mode(target.mode);
        written.extend(writer.write(code)?);

        for staged in target.staged_assets() {
            let destination = staged.destination(&self.out_dir, Path::new(""));
            let Some(asset) = result.asset(&staged.asset) else {
                continue;
            };
            let spec = ArtifactSpec::new(destination, Some(asset.source.as_slice()))
                .permissions(asset.permissions);
            written.extend(writer.write(spec)?);
        }

        Ok(written)
    }

    fn enter(&self, report: &mut BuildReport, state: PipelineState) {
        info!(%state, "pipeline state");
        report.states.push(state);
        self.observer.state_changed(state);
    }
}

/// A clean or output directory must be a relative path below the project
/// root, never the root itself.
fn check_dir(dir: &Path, what: &str) -> Result<()> {
    let mut depth = 0usize;
    for component in dir.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir if depth > 0 => depth -= 1,
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                depth = 0;
                break;
            }
        }
    }
    if depth == 0 {
        return Err(Error::InvalidOutputPath(format!(
            "{what} '{}' must be a relative path inside the project",
            dir.display()
        )));
    }
    Ok(())
}

/// Written `.js` files under `out_dir`, relative to `root`, sorted, one
/// entry per path. Assets staged back into the project are not listed.
fn listing(root: &Path, out_dir: &Path, written: &[WrittenArtifact]) -> Vec<ListingEntry> {
    let out_dir = out_dir.clean();
    let mut entries: Vec<ListingEntry> = written
        .iter()
        .filter(|artifact| artifact.path.extension().is_some_and(|ext| ext == "js"))
        .filter_map(|artifact| {
            let path = artifact.path.strip_prefix(root).ok()?;
            path.starts_with(&out_dir).then(|| ListingEntry {
                path: path.to_path_buf(),
                size: artifact.size,
            })
        })
        .collect();

    entries.sort_by(|a, b| a.path.cmp(&b.path));
    // A later write to the same path wins.
    entries.dedup_by(|later, earlier| {
        if later.path == earlier.path {
            earlier.size = later.size;
            true
        } else {
            false
        }
    });
    entries
}
