//! Build targets: one bundler entry point and everything staged from it.

use std::collections::BTreeSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::integrity::AllowPattern;
use crate::writer::FileMode;

/// Suffixes of the compile-cache companions every target may emit.
const CACHE_SUFFIXES: [&str; 2] = [".cache", ".cache.js"];

/// Options that vary per target rather than per run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TargetOptions {
    /// Module names left as runtime requires instead of being bundled.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub externals: BTreeSet<String>,

    /// File name for the aggregated third-party license text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,

    /// Ask the bundler not to emit referenced files as assets.
    #[serde(default)]
    pub suppress_asset_emission: bool,
}

impl TargetOptions {
    pub fn external(mut self, module: impl Into<String>) -> Self {
        self.externals.insert(module.into());
        self
    }

    pub fn license(mut self, file_name: impl Into<String>) -> Self {
        self.license = Some(file_name.into());
        self
    }

    pub fn suppress_asset_emission(mut self, suppress: bool) -> Self {
        self.suppress_asset_emission = suppress;
        self
    }
}

/// Directory a staged asset destination is relative to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageRoot {
    #[default]
    Output,
    Project,
}

/// A bundler asset routed to a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StagedAsset {
    pub asset: String,
    pub to: PathBuf,
    #[serde(default)]
    pub root: StageRoot,
}

impl StagedAsset {
    pub fn output(asset: impl Into<String>, to: impl Into<PathBuf>) -> Self {
        Self {
            asset: asset.into(),
            to: to.into(),
            root: StageRoot::Output,
        }
    }

    pub fn project(asset: impl Into<String>, to: impl Into<PathBuf>) -> Self {
        Self {
            asset: asset.into(),
            to: to.into(),
            root: StageRoot::Project,
        }
    }

    /// Destination resolved against the output directory or project root.
    pub fn destination(&self, out_dir: &Path, project_root: &Path) -> PathBuf {
        match self.root {
            StageRoot::Output => out_dir.join(&self.to),
            StageRoot::Project => project_root.join(&self.to),
        }
    }
}

/// One bundling unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BuildTarget {
    pub name: String,

    /// Entry path, relative to the project root.
    pub source: PathBuf,

    /// Output file, relative to the output directory.
    pub output: PathBuf,

    #[serde(default)]
    pub mode: FileMode,

    #[serde(default)]
    pub options: TargetOptions,

    /// Allow patterns on top of [`AllowPattern::baseline`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allow: Vec<AllowPattern>,

    /// Assets staged on top of the cache companions and license file.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stage: Vec<StagedAsset>,
}

impl BuildTarget {
    pub fn new(name: impl Into<String>, source: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            output: output.into(),
            mode: FileMode::Default,
            options: TargetOptions::default(),
            allow: Vec::new(),
            stage: Vec::new(),
        }
    }

    pub fn mode(mut self, mode: FileMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn options(mut self, options: TargetOptions) -> Self {
        self.options = options;
        self
    }

    pub fn allow(mut self, pattern: AllowPattern) -> Self {
        self.allow.push(pattern);
        self
    }

    pub fn stage(mut self, asset: StagedAsset) -> Self {
        self.stage.push(asset);
        self
    }

    /// Final path component of the output, which is also the name the
    /// bundler uses as a prefix for this target's cache assets.
    pub fn file_name(&self) -> &str {
        self.output
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
    }

    /// Baseline patterns followed by the target's own.
    pub fn allow_patterns(&self) -> Vec<AllowPattern> {
        let mut patterns = AllowPattern::baseline();
        patterns.extend(self.allow.iter().cloned());
        patterns
    }

    /// Every asset this target stages, in write order.
    ///
    /// The compile-cache companions and the license file (when the target
    /// aggregates one) are implied; explicit entries follow.
    pub fn staged_assets(&self) -> Vec<StagedAsset> {
        let mut staged: Vec<_> = CACHE_SUFFIXES
            .iter()
            .map(|suffix| {
                StagedAsset::output(
                    format!("{}{}", self.file_name(), suffix),
                    with_suffix(&self.output, suffix),
                )
            })
            .collect();

        if let Some(license) = &self.options.license {
            let to = self.output.parent().unwrap_or(Path::new("")).join(license);
            staged.push(StagedAsset::output(license.clone(), to));
        }

        staged.extend(self.stage.iter().cloned());
        staged
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut raw: OsString = path.as_os_str().to_owned();
    raw.push(suffix);
    PathBuf::from(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_of_nested_output() {
        let target = BuildTarget::new("relocate-loader", "src/loaders/relocate-loader", "loaders/relocate-loader.js");
        assert_eq!(target.file_name(), "relocate-loader.js");
    }

    #[test]
    fn test_staged_assets_include_cache_companions() {
        let target = BuildTarget::new("ts-loader", "src/loaders/ts-loader", "loaders/ts-loader.js");
        let staged = target.staged_assets();

        assert_eq!(
            staged,
            vec![
                StagedAsset::output("ts-loader.js.cache", "loaders/ts-loader.js.cache"),
                StagedAsset::output("ts-loader.js.cache.js", "loaders/ts-loader.js.cache.js"),
            ]
        );
    }

    #[test]
    fn test_staged_assets_include_license_and_extras() {
        let target = BuildTarget::new("cli", "src/cli", "cli.js")
            .options(TargetOptions::default().license("LICENSES.txt"))
            .stage(StagedAsset::project("cli.js.cache.js", "src/cli.js.cache.js"));

        let staged = target.staged_assets();
        assert_eq!(staged.len(), 4);
        assert_eq!(staged[2], StagedAsset::output("LICENSES.txt", "LICENSES.txt"));
        assert_eq!(staged[3].root, StageRoot::Project);
    }

    #[test]
    fn test_staged_destination_roots() {
        let out = Path::new("/p/dist/ncc");
        let root = Path::new("/p");

        let output = StagedAsset::output("a.cache", "loaders/a.cache");
        let project = StagedAsset::project("a.cache.js", "src/a.cache.js");

        assert_eq!(output.destination(out, root), Path::new("/p/dist/ncc/loaders/a.cache"));
        assert_eq!(project.destination(out, root), Path::new("/p/src/a.cache.js"));
    }

    #[test]
    fn test_allow_patterns_extend_baseline() {
        let target = BuildTarget::new("index", "src/index", "index.js")
            .allow(AllowPattern::prefix("locales/"));
        let patterns = target.allow_patterns();

        assert_eq!(patterns.len(), AllowPattern::baseline().len() + 1);
        assert_eq!(patterns.last(), Some(&AllowPattern::prefix("locales/")));
    }

    #[test]
    fn test_deserialize_target() {
        let target: BuildTarget = serde_json::from_str(
            r#"{
                "name": "cli",
                "source": "src/cli",
                "output": "cli.js",
                "mode": "executable",
                "options": { "externals": ["./index.js"], "license": "LICENSES.txt" },
                "allow": [{ "exact": "worker.js" }],
                "stage": [{ "asset": "cli.js.cache.js", "to": "src/cli.js.cache.js", "root": "project" }]
            }"#,
        )
        .unwrap();

        assert_eq!(target.mode, FileMode::Executable);
        assert!(target.options.externals.contains("./index.js"));
        assert_eq!(target.allow, vec![AllowPattern::exact("worker.js")]);
        assert_eq!(target.stage[0].root, StageRoot::Project);
    }

    #[test]
    fn test_deserialize_rejects_unknown_fields() {
        let result: Result<BuildTarget, _> = serde_json::from_str(
            r#"{ "name": "cli", "source": "src/cli", "output": "cli.js", "minify": false }"#,
        );
        assert!(result.is_err());
    }
}
