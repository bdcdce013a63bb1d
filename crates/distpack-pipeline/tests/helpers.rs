//! Shared test utilities for pipeline tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use distpack_pipeline::{BuildConfig, BundleResult, Bundler, BundlerFailure};
use tempfile::TempDir;

/// An in-process bundler with scripted output.
///
/// Every target gets deterministic code plus `<file>.cache` and
/// `<file>.cache.js` assets; a `license` option adds that asset too.
#[derive(Default)]
pub struct FakeBundler {
    failing: HashSet<String>,
    extra_assets: BTreeMap<String, Vec<(String, Vec<u8>)>>,
    permissions: BTreeMap<(String, String), u32>,
    calls: Mutex<Vec<String>>,
    configs: Mutex<Vec<BuildConfig>>,
}

impl FakeBundler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the target whose output file is `filename` fail.
    pub fn failing(mut self, filename: &str) -> Self {
        self.failing.insert(filename.to_string());
        self
    }

    /// Emit an additional asset for `filename`.
    pub fn with_asset(mut self, filename: &str, asset: &str, source: &[u8]) -> Self {
        self.extra_assets
            .entry(filename.to_string())
            .or_default()
            .push((asset.to_string(), source.to_vec()));
        self
    }

    /// Request permission bits for one of `filename`'s assets.
    pub fn with_permissions(mut self, filename: &str, asset: &str, bits: u32) -> Self {
        self.permissions
            .insert((filename.to_string(), asset.to_string()), bits);
        self
    }

    /// Output file names in invocation order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn configs(&self) -> Vec<BuildConfig> {
        self.configs.lock().unwrap().clone()
    }
}

#[async_trait]
impl Bundler for FakeBundler {
    async fn bundle(
        &self,
        entry: &Path,
        config: &BuildConfig,
    ) -> Result<BundleResult, BundlerFailure> {
        let filename = config.filename.clone();
        self.calls.lock().unwrap().push(filename.clone());
        self.configs.lock().unwrap().push(config.clone());

        if self.failing.contains(&filename) {
            return Err(BundlerFailure::new(format!(
                "Module not found: Error: Can't resolve '{}'",
                entry.display()
            )));
        }

        let mut result = BundleResult::new(format!(
            "/* {filename} minify={} */ module.exports = {{}};\n",
            config.minify
        ))
        .with_asset(format!("{filename}.cache"), vec![0u8, 159, 146, 150])
        .with_asset(format!("{filename}.cache.js"), format!("// cache loader for {filename}"));

        if let Some(license) = &config.license_file_name {
            result = result.with_asset(license.clone(), "MIT License\n");
        }

        for (name, source) in self.extra_assets.get(&filename).into_iter().flatten() {
            result = result.with_asset(name.clone(), source.clone());
        }

        for ((owner, name), bits) in &self.permissions {
            if owner == &filename {
                if let Some(asset) = result.assets.get_mut(name) {
                    asset.permissions = Some(*bits);
                }
            }
        }

        Ok(result)
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// A scratch project with the helper files the standard manifest copies.
pub fn standard_project() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    for (path, content) in [
        ("package.json", r#"{ "name": "fixture" }"#),
        ("src/typescript.js", "module.exports = require('typescript');\n"),
        ("src/loaders/uncacheable.js", "module.exports = function () { this.cacheable(false); };\n"),
        ("src/loaders/empty-loader.js", "module.exports = () => '';\n"),
        ("src/loaders/notfound-loader.js", "module.exports = () => 'throw new Error()';\n"),
        ("src/@@notfound.js", "throw new Error('not found');\n"),
        ("node_modules/typescript/lib/lib.es5.d.ts", "interface Array<T> {}\n"),
        ("node_modules/typescript/lib/lib.dom.d.ts", "interface Window {}\n"),
    ] {
        put(root, path, content);
    }

    temp
}

pub fn put(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Every file under `dir` with its contents, keyed by relative path.
pub fn tree_snapshot(dir: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    walkdir::WalkDir::new(dir)
        .into_iter()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let relative = e.path().strip_prefix(dir).unwrap().to_path_buf();
            (relative, fs::read(e.path()).unwrap())
        })
        .collect()
}
