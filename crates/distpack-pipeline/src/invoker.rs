//! Invocation of the external bundler for one build target.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::bundle::BundleResult;
use crate::config::{BuildConfig, BuildSettings};
use crate::target::BuildTarget;
use crate::{Error, Result};

/// Diagnostic text from a bundler that could not produce a bundle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct BundlerFailure {
    pub message: String,
}

impl BundlerFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The bundling engine.
///
/// Implementations must be deterministic: the same entry and configuration
/// must produce byte-identical code and assets. Any on-disk cache named by
/// [`BuildConfig::cache_dir`] belongs to the implementation.
#[async_trait]
pub trait Bundler: Send + Sync {
    /// Bundle the module at `entry` (an absolute path).
    async fn bundle(
        &self,
        entry: &Path,
        config: &BuildConfig,
    ) -> std::result::Result<BundleResult, BundlerFailure>;

    /// Short name used in logs.
    fn name(&self) -> &str {
        "bundler"
    }
}

/// Runs the bundler for individual targets with the run-wide settings.
#[derive(Clone)]
pub struct BundleInvoker {
    bundler: Arc<dyn Bundler>,
    settings: BuildSettings,
    project_root: PathBuf,
}

impl std::fmt::Debug for BundleInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundleInvoker")
            .field("bundler", &self.bundler.name())
            .field("settings", &self.settings)
            .field("project_root", &self.project_root)
            .finish()
    }
}

impl BundleInvoker {
    pub fn new(bundler: Arc<dyn Bundler>, settings: BuildSettings, project_root: impl Into<PathBuf>) -> Self {
        Self {
            bundler,
            settings,
            project_root: project_root.into(),
        }
    }

    pub fn settings(&self) -> &BuildSettings {
        &self.settings
    }

    /// Bundle one target. Failures are not retried.
    ///
    /// # Errors
    ///
    /// [`Error::Bundling`] carrying the bundler's diagnostic.
    #[instrument(skip_all, fields(build = %target.name))]
    pub async fn invoke(&self, target: &BuildTarget) -> Result<BundleResult> {
        let entry = self.project_root.join(&target.source);
        let config = self.settings.config_for(target);

        debug!(
            bundler = self.bundler.name(),
            entry = %entry.display(),
            ?config,
            "invoking bundler"
        );

        let result = self
            .bundler
            .bundle(&entry, &config)
            .await
            .map_err(|failure| Error::Bundling {
                target: target.name.clone(),
                diagnostic: failure.message,
            })?;

        debug!(
            code_bytes = result.code.len(),
            assets = result.assets.len(),
            "bundler finished"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recording {
        calls: Mutex<Vec<(PathBuf, BuildConfig)>>,
        fail: bool,
    }

    #[async_trait]
    impl Bundler for Recording {
        async fn bundle(
            &self,
            entry: &Path,
            config: &BuildConfig,
        ) -> std::result::Result<BundleResult, BundlerFailure> {
            self.calls
                .lock()
                .unwrap()
                .push((entry.to_path_buf(), config.clone()));
            if self.fail {
                Err(BundlerFailure::new("Module not found: Can't resolve './missing'"))
            } else {
                Ok(BundleResult::new(format!("// {}", config.filename)))
            }
        }
    }

    #[tokio::test]
    async fn test_invoke_resolves_entry_and_config() {
        let bundler = Arc::new(Recording::default());
        let invoker = BundleInvoker::new(
            bundler.clone(),
            BuildSettings::new().minify(false),
            "/project",
        );
        let target = BuildTarget::new("index", "src/index", "index.js");

        let result = invoker.invoke(&target).await.unwrap();

        assert_eq!(result.code, b"// index.js");
        let calls = bundler.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, PathBuf::from("/project/src/index"));
        assert!(!calls[0].1.minify);
    }

    #[tokio::test]
    async fn test_invoke_failure_names_target() {
        let bundler = Arc::new(Recording {
            fail: true,
            ..Default::default()
        });
        let invoker = BundleInvoker::new(bundler, BuildSettings::new(), "/project");
        let target = BuildTarget::new("cli", "src/cli", "cli.js");

        let err = invoker.invoke(&target).await.unwrap_err();

        match err {
            Error::Bundling { target, diagnostic } => {
                assert_eq!(target, "cli");
                assert!(diagnostic.contains("Can't resolve"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
