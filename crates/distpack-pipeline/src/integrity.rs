//! Asset allowlists and drift detection.
//!
//! A bundler upgrade or a new dependency can make a target start emitting
//! files nobody stages. Each target declares which asset names it expects;
//! anything else is reported as drift.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::bundle::BundleResult;
use crate::target::BuildTarget;
use crate::{Error, Result};

/// A rule matching expected asset names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllowPattern {
    Exact(String),
    Suffix(String),
    Prefix(String),
}

impl AllowPattern {
    pub fn exact(name: impl Into<String>) -> Self {
        AllowPattern::Exact(name.into())
    }

    pub fn suffix(suffix: impl Into<String>) -> Self {
        AllowPattern::Suffix(suffix.into())
    }

    pub fn prefix(prefix: impl Into<String>) -> Self {
        AllowPattern::Prefix(prefix.into())
    }

    pub fn matches(&self, asset: &str) -> bool {
        match self {
            AllowPattern::Exact(name) => asset == name,
            AllowPattern::Suffix(suffix) => asset.ends_with(suffix.as_str()),
            AllowPattern::Prefix(prefix) => asset.starts_with(prefix.as_str()),
        }
    }

    /// Patterns every target accepts: compile caches, license aggregation,
    /// and the helper files the bundler always ships.
    pub fn baseline() -> Vec<AllowPattern> {
        vec![
            AllowPattern::suffix(".cache"),
            AllowPattern::suffix(".cache.js"),
            AllowPattern::suffix("LICENSES.txt"),
            AllowPattern::exact("processChild.js"),
            AllowPattern::exact("mappings.wasm"),
        ]
    }
}

/// Return the asset names that match none of `patterns`.
///
/// Pure: the result depends only on the set of names, not their order.
pub fn validate<'a>(
    target_name: &str,
    actual_assets: impl IntoIterator<Item = &'a str>,
    patterns: &[AllowPattern],
) -> BTreeSet<String> {
    let unexpected: BTreeSet<String> = actual_assets
        .into_iter()
        .filter(|asset| !patterns.iter().any(|pattern| pattern.matches(asset)))
        .map(str::to_string)
        .collect();

    debug!(
        build = target_name,
        unexpected = unexpected.len(),
        "validated emitted assets"
    );

    unexpected
}

/// What to do when a target emits unexpected assets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrityPolicy {
    /// Log the drift and keep building.
    #[default]
    Warn,
    /// Fail the run before the target's artifacts are written.
    Deny,
}

/// Unexpected assets emitted by one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrityReport {
    pub target: String,
    pub unexpected: BTreeSet<String>,
}

impl IntegrityReport {
    /// Check `result` against the target's allowlist. `None` means no drift.
    pub fn check(target: &BuildTarget, result: &BundleResult) -> Option<Self> {
        let unexpected = validate(&target.name, result.asset_names(), &target.allow_patterns());
        (!unexpected.is_empty()).then(|| IntegrityReport {
            target: target.name.clone(),
            unexpected,
        })
    }
}

impl IntegrityPolicy {
    /// Apply the policy to a drift report.
    ///
    /// # Errors
    ///
    /// [`Error::AssetIntegrity`] under [`IntegrityPolicy::Deny`].
    pub fn enforce(self, report: &IntegrityReport) -> Result<()> {
        match self {
            IntegrityPolicy::Warn => {
                warn!(
                    build = %report.target,
                    assets = ?report.unexpected,
                    "new assets are being emitted by the {} build",
                    report.target
                );
                Ok(())
            }
            IntegrityPolicy::Deny => Err(Error::AssetIntegrity {
                target: report.target.clone(),
                assets: report.unexpected.iter().cloned().collect(),
            }),
        }
    }
}
