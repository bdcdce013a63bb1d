//! Bundler configuration.
//!
//! [`BuildSettings`] holds the global switches derived from the command line
//! and is built once per process. [`BuildConfig`] is the per-target record
//! handed to the bundler: the settings merged with one target's options.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Serialize, Serializer};

use crate::target::BuildTarget;

/// Global build switches.
///
/// Every switch defaults to the enabled behaviour; the command line can only
/// turn things off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSettings {
    pub minify: bool,
    pub compile_cache: bool,
    pub cache_dir: Option<PathBuf>,
    pub source_transform: bool,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl BuildSettings {
    /// Settings with minification, compile caching and the source transform
    /// enabled, and no on-disk cache directory.
    pub fn new() -> Self {
        Self {
            minify: true,
            compile_cache: true,
            cache_dir: None,
            source_transform: true,
        }
    }

    pub fn minify(mut self, enabled: bool) -> Self {
        self.minify = enabled;
        self
    }

    pub fn compile_cache(mut self, enabled: bool) -> Self {
        self.compile_cache = enabled;
        self
    }

    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    pub fn no_cache_dir(mut self) -> Self {
        self.cache_dir = None;
        self
    }

    pub fn source_transform(mut self, enabled: bool) -> Self {
        self.source_transform = enabled;
        self
    }

    /// Merge these settings with a target's own options.
    pub fn config_for(&self, target: &BuildTarget) -> BuildConfig {
        BuildConfig {
            filename: target.file_name().to_string(),
            minify: self.minify,
            use_compile_cache: self.compile_cache,
            cache_dir: self.cache_dir.clone(),
            skip_source_transform: !self.source_transform,
            externals: target.options.externals.clone(),
            license_file_name: target.options.license.clone(),
            suppress_asset_emission: target.options.suppress_asset_emission,
        }
    }
}

/// Configuration passed to the bundler for one target.
///
/// Serialises to the option names the bundler bridge understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildConfig {
    pub filename: String,
    pub minify: bool,
    #[serde(rename = "v8cache")]
    pub use_compile_cache: bool,
    #[serde(rename = "cache", serialize_with = "serialize_cache_dir")]
    pub cache_dir: Option<PathBuf>,
    #[serde(rename = "nobabel")]
    pub skip_source_transform: bool,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub externals: BTreeSet<String>,
    #[serde(rename = "license", skip_serializing_if = "Option::is_none")]
    pub license_file_name: Option<String>,
    #[serde(rename = "noAssetBuilds")]
    pub suppress_asset_emission: bool,
}

impl BuildConfig {
    pub fn cache_dir(&self) -> Option<&Path> {
        self.cache_dir.as_deref()
    }
}

/// A disabled cache is sent as `false`, an enabled one as its path.
fn serialize_cache_dir<S: Serializer>(dir: &Option<PathBuf>, serializer: S) -> Result<S::Ok, S::Error> {
    match dir {
        Some(path) => path.serialize(serializer),
        None => serializer.serialize_bool(false),
    }
}
