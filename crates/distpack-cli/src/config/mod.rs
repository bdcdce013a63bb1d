//! Configuration for distpack with multi-source loading.
//!
//! Merges settings from CLI args, `DISTPACK_*` environment variables and
//! `distpack.config.json`.
//! Priority: CLI > Environment > File > Defaults

mod defaults;
mod loading;
mod validation;

use distpack_pipeline::{BuildManifest, BuildSettings, CommandBundler, IntegrityPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use defaults::*;
pub use loading::{ConfigOverrides, CONFIG_FILE_NAME};

use crate::commands::utils::resolve_path;
use crate::error::{ConfigError, Result};

/// distpack configuration - loaded from distpack.config.json, the
/// environment and CLI flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DistpackConfig {
    /// Output directory, relative to the project root
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    /// Directory swept for stale artifacts before a build
    #[serde(default = "default_clean_dir")]
    pub clean_dir: PathBuf,

    /// Minify bundled code
    #[serde(default = "default_enabled")]
    pub minify: bool,

    /// Emit compiled-code cache companions
    #[serde(default = "default_enabled")]
    pub v8cache: bool,

    /// Pass an on-disk cache directory to the bundler
    #[serde(default = "default_enabled")]
    pub cache: bool,

    /// Cache directory used when `cache` is on
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Run the bundler's optional source-rewrite pass
    #[serde(default = "default_enabled")]
    pub babel: bool,

    /// What to do with assets outside a target's allowlist
    #[serde(default)]
    pub integrity: IntegrityPolicy,

    #[serde(default)]
    pub bundler: BundlerConfig,

    /// Targets and helper copies; the standard ncc layout when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<BuildManifest>,
}

/// How to start the bundler bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BundlerConfig {
    /// Program and arguments, run from the project root
    #[serde(default = "default_bundler_command")]
    pub command: Vec<String>,
}

impl Default for BundlerConfig {
    fn default() -> Self {
        Self {
            command: default_bundler_command(),
        }
    }
}

impl DistpackConfig {
    /// Global switches for a build rooted at `project_root`.
    pub fn settings(&self, project_root: &Path) -> BuildSettings {
        let settings = BuildSettings::new()
            .minify(self.minify)
            .compile_cache(self.v8cache)
            .source_transform(self.babel);

        if self.cache {
            settings.cache_dir(resolve_path(&self.cache_dir, project_root))
        } else {
            settings.no_cache_dir()
        }
    }

    /// The configured manifest, or the standard one.
    pub fn manifest(&self) -> BuildManifest {
        self.manifest.clone().unwrap_or_else(BuildManifest::standard)
    }

    /// The bundler bridge, started in `project_root`.
    pub fn bundler(&self, project_root: &Path) -> Result<CommandBundler> {
        let bundler = CommandBundler::from_command_line(&self.bundler.command).ok_or_else(|| {
            ConfigError::MissingField {
                field: "bundler.command".to_string(),
                hint: "Set bundler.command to the program that bundles one entry, e.g. [\"node\", \"scripts/bundle.js\"]".to_string(),
            }
        })?;
        Ok(bundler.current_dir(project_root))
    }
}
