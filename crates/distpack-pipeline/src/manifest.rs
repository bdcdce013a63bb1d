//! The declarative description of a distribution build.
//!
//! A [`BuildManifest`] lists the targets to bundle, in order, and the helper
//! files copied alongside them. Everything the pipeline can write is derived
//! from it, so [`BuildManifest::expected_outputs`] can answer "what will a
//! build produce?" without running one.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::integrity::AllowPattern;
use crate::target::{BuildTarget, StageRoot, StagedAsset, TargetOptions};
use crate::writer::FileMode;
use crate::{Error, Result};

/// A helper file copied into the output without bundling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VerbatimFile {
    /// Source, relative to the project root.
    pub source: PathBuf,
    /// Destination, relative to the output directory.
    pub to: PathBuf,
}

impl VerbatimFile {
    pub fn new(source: impl Into<PathBuf>, to: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            to: to.into(),
        }
    }
}

/// A glob of files copied into one output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TreeCopy {
    /// Glob, relative to the project root.
    pub pattern: String,
    /// Directory, relative to the output directory.
    pub to: PathBuf,
}

impl TreeCopy {
    pub fn new(pattern: impl Into<String>, to: impl Into<PathBuf>) -> Self {
        Self {
            pattern: pattern.into(),
            to: to.into(),
        }
    }
}

/// A file a build may write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpectedOutput {
    pub path: PathBuf,
    /// Only written if the bundler emits the matching asset, or (for tree
    /// copies) if the glob matches anything.
    pub optional: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BuildManifest {
    pub targets: Vec<BuildTarget>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub verbatim: Vec<VerbatimFile>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trees: Vec<TreeCopy>,
}

impl BuildManifest {
    /// The ncc distribution: CLI, programmatic API, loaders and the source
    /// map register hook.
    pub fn standard() -> Self {
        let loader = |name: &str| {
            BuildTarget::new(
                name,
                format!("src/loaders/{name}"),
                format!("loaders/{name}.js"),
            )
        };

        let targets = vec![
            BuildTarget::new("cli", "src/cli", "cli.js")
                .mode(FileMode::Executable)
                .options(
                    TargetOptions::default()
                        .external("./index.js")
                        .license("LICENSES.txt"),
                ),
            BuildTarget::new("index", "src/index", "index.js")
                .allow(AllowPattern::prefix("locales/"))
                .allow(AllowPattern::exact("worker.js"))
                .allow(AllowPattern::exact("index1.js"))
                .allow(AllowPattern::exact("minify.js")),
            loader("relocate-loader"),
            loader("shebang-loader"),
            loader("ts-loader")
                .options(TargetOptions::default().suppress_asset_emission(true))
                .allow(AllowPattern::prefix("lib/"))
                .allow(AllowPattern::prefix("typescript/lib")),
            loader("stringify-loader"),
            BuildTarget::new(
                "sourcemap-register",
                "node_modules/source-map-support/register",
                "sourcemap-register.js",
            )
            .stage(StagedAsset::project(
                "sourcemap-register.js.cache.js",
                "src/sourcemap-register.js.cache.js",
            )),
        ];

        let verbatim = [
            "typescript.js",
            "loaders/uncacheable.js",
            "loaders/empty-loader.js",
            "loaders/notfound-loader.js",
            "@@notfound.js",
        ]
        .into_iter()
        .map(|name| VerbatimFile::new(Path::new("src").join(name), name))
        .collect();

        Self {
            targets,
            verbatim,
            trees: vec![TreeCopy::new(
                "node_modules/typescript/lib/*.ts",
                "loaders/typescript/lib",
            )],
        }
    }

    /// Check the manifest for mistakes that would otherwise surface halfway
    /// through a build.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidManifest`] naming the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.targets.is_empty() {
            return Err(Error::InvalidManifest("no build targets".to_string()));
        }

        let mut names = HashSet::new();
        let mut outputs = HashSet::new();

        for target in &self.targets {
            if target.name.is_empty() {
                return Err(Error::InvalidManifest("target with empty name".to_string()));
            }
            if !names.insert(target.name.as_str()) {
                return Err(Error::InvalidManifest(format!(
                    "duplicate target name '{}'",
                    target.name
                )));
            }
            check_relative(&target.output, &format!("output of target '{}'", target.name))?;
            if target.file_name().is_empty() {
                return Err(Error::InvalidManifest(format!(
                    "output of target '{}' has no file name",
                    target.name
                )));
            }
            if !outputs.insert(target.output.as_path()) {
                return Err(Error::InvalidManifest(format!(
                    "output '{}' is produced by more than one target",
                    target.output.display()
                )));
            }
            for staged in &target.stage {
                check_relative(&staged.to, &format!("staged asset '{}'", staged.asset))?;
            }
        }

        for file in &self.verbatim {
            check_relative(&file.to, &format!("verbatim copy of '{}'", file.source.display()))?;
        }
        for tree in &self.trees {
            check_relative(&tree.to, &format!("tree copy '{}'", tree.pattern))?;
        }

        Ok(())
    }

    /// Every file a build with this manifest may write, in write order.
    ///
    /// Paths are `out_dir`-prefixed, except for assets staged relative to the
    /// project, which are returned as given.
    pub fn expected_outputs(&self, out_dir: &Path) -> Vec<ExpectedOutput> {
        let mut expected = Vec::new();

        for target in &self.targets {
            expected.push(ExpectedOutput {
                path: out_dir.join(&target.output),
                optional: false,
            });
            for staged in target.staged_assets() {
                let path = match staged.root {
                    StageRoot::Output => out_dir.join(&staged.to),
                    StageRoot::Project => staged.to.clone(),
                };
                expected.push(ExpectedOutput {
                    path,
                    optional: true,
                });
            }
        }

        expected.extend(self.verbatim.iter().map(|file| ExpectedOutput {
            path: out_dir.join(&file.to),
            optional: false,
        }));

        expected.extend(self.trees.iter().map(|tree| {
            let file_pattern = Path::new(&tree.pattern)
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_default();
            ExpectedOutput {
                path: out_dir.join(&tree.to).join(file_pattern),
                optional: true,
            }
        }));

        expected
    }
}

fn check_relative(path: &Path, what: &str) -> Result<()> {
    let escapes = path
        .components()
        .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));
    if path.as_os_str().is_empty() || escapes {
        return Err(Error::InvalidManifest(format!(
            "{what} must be a relative path inside the output, got '{}'",
            path.display()
        )));
    }
    Ok(())
}
