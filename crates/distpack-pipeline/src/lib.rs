//! # distpack-pipeline
//!
//! Build orchestration for multi-entry bundle distributions.
//!
//! The crate drives an external bundler once per declared [`BuildTarget`],
//! checks the assets each invocation emitted against an allowlist, and stages
//! code, caches and helper files into an output tree. It never parses or
//! transforms source code itself.
//!
//! ## Quick Start
//!
//! ```no_run
//! use distpack_pipeline::{BuildManifest, BuildPipeline, BuildSettings, CommandBundler};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let root = std::env::current_dir()?;
//! let bundler = CommandBundler::new("node", ["scripts/bundle.js"]).current_dir(&root);
//!
//! let report = BuildPipeline::builder(BuildManifest::standard(), Arc::new(bundler))
//!     .project_root(&root)
//!     .settings(BuildSettings::new().cache_dir(root.join(".cache")))
//!     .build()
//!     .run()
//!     .await?;
//!
//! for entry in &report.listing {
//!     println!("{} ({} bytes)", entry.path.display(), entry.size);
//! }
//! # Ok(()) }
//! ```
//!
//! This crate only emits `tracing` events; installing a subscriber is left
//! to the binary.

pub mod bundle;
pub mod cleaner;
pub mod command;
pub mod config;
pub mod copier;
pub mod integrity;
pub mod invoker;
pub mod manifest;
pub mod pipeline;
pub mod target;
pub mod writer;

pub use bundle::{Asset, BundleResult};
pub use cleaner::{CleanRule, OutputCleaner};
pub use command::CommandBundler;
pub use config::{BuildConfig, BuildSettings};
pub use copier::AuxiliaryAssetCopier;
pub use integrity::{validate, AllowPattern, IntegrityPolicy, IntegrityReport};
pub use invoker::{BundleInvoker, Bundler, BundlerFailure};
pub use manifest::{BuildManifest, ExpectedOutput, TreeCopy, VerbatimFile};
pub use pipeline::{
    BuildObserver, BuildPipeline, BuildPipelineBuilder, BuildReport, ListingEntry, PipelineState,
};
pub use target::{BuildTarget, StageRoot, StagedAsset, TargetOptions};
pub use writer::{ArtifactSpec, ArtifactWriter, FileMode, WrittenArtifact};

use std::path::PathBuf;

/// Filesystem operation that failed, carried by [`Error::FileSystem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsOp {
    Walk,
    Remove,
    CreateDir,
    Write,
    Read,
    SetPermissions,
}

impl std::fmt::Display for FsOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let op = match self {
            FsOp::Walk => "scan",
            FsOp::Remove => "remove",
            FsOp::CreateDir => "create directory",
            FsOp::Write => "write",
            FsOp::Read => "read",
            FsOp::SetPermissions => "set permissions on",
        };
        f.write_str(op)
    }
}

/// Error types for pipeline operations.
///
/// Every variant is fatal for the run that produced it. Asset drift is only
/// an error under [`IntegrityPolicy::Deny`]; otherwise it is reported through
/// [`BuildReport::integrity`].
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum Error {
    /// The external bundler could not resolve or compile a target.
    #[error("Bundling failed for target '{target}': {diagnostic}")]
    #[diagnostic(
        code(distpack::bundling),
        help("No later target was built. Fix the reported problem and rerun the build.")
    )]
    Bundling { target: String, diagnostic: String },

    /// Unexpected assets were emitted and the integrity policy is `deny`.
    #[error("Target '{target}' emitted unexpected assets: {}", .assets.join(", "))]
    #[diagnostic(
        code(distpack::asset_integrity),
        help("Add allow patterns for these assets to the target, or build without --strict-assets.")
    )]
    AssetIntegrity { target: String, assets: Vec<String> },

    /// A filesystem operation on the output tree failed.
    #[error("Failed to {op} '{}': {source}", .path.display())]
    #[diagnostic(code(distpack::filesystem))]
    FileSystem {
        op: FsOp,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A destination path escapes the project root or is otherwise unusable.
    #[error("Invalid output path: {0}")]
    #[diagnostic(code(distpack::invalid_output_path))]
    InvalidOutputPath(String),

    /// The build manifest is inconsistent.
    #[error("Invalid build manifest: {0}")]
    #[diagnostic(code(distpack::invalid_manifest))]
    InvalidManifest(String),

    /// A tree-copy glob pattern could not be parsed.
    #[error("Invalid glob pattern: {0}")]
    #[diagnostic(code(distpack::glob))]
    Glob(String),
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn fs(op: FsOp, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::FileSystem {
            op,
            path: path.into(),
            source,
        }
    }
}
