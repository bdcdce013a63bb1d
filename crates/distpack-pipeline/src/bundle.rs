//! Output of a single bundler invocation.

use std::collections::BTreeMap;

/// A named side file emitted by the bundler next to the main code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub source: Vec<u8>,
    /// Unix permission bits requested by the bundler, applied when the
    /// asset is staged.
    pub permissions: Option<u32>,
}

impl Asset {
    pub fn new(source: impl Into<Vec<u8>>) -> Self {
        Self {
            source: source.into(),
            permissions: None,
        }
    }
}

/// Code and assets produced for one build target.
///
/// A result is owned by the invocation that produced it and is consumed by
/// validation and staging for that target only. Assets are kept in name order
/// so that everything derived from them is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleResult {
    pub code: Vec<u8>,
    pub assets: BTreeMap<String, Asset>,
}

impl BundleResult {
    pub fn new(code: impl Into<Vec<u8>>) -> Self {
        Self {
            code: code.into(),
            assets: BTreeMap::new(),
        }
    }

    /// Add an asset, replacing any previous asset with the same name.
    pub fn with_asset(mut self, name: impl Into<String>, source: impl Into<Vec<u8>>) -> Self {
        self.assets.insert(name.into(), Asset::new(source));
        self
    }

    pub fn asset(&self, name: &str) -> Option<&Asset> {
        self.assets.get(name)
    }

    /// Content of the named asset, or `None` when the bundler did not emit it.
    pub fn asset_source(&self, name: &str) -> Option<&[u8]> {
        self.asset(name).map(|asset| asset.source.as_slice())
    }

    pub fn asset_names(&self) -> impl Iterator<Item = &str> {
        self.assets.keys().map(String::as_str)
    }
}
