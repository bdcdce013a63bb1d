use crate::cli::{BuildArgs, ProjectArgs};
use crate::commands::utils::resolve_path;
use crate::config::DistpackConfig;
use crate::error::{ConfigError, Result};
use distpack_pipeline::IntegrityPolicy;
use figment::{
    providers::{Env, Format as _, Json, Serialized},
    Figment,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Config file looked up in the project root when `--config` is not given.
pub const CONFIG_FILE_NAME: &str = "distpack.config.json";

/// Values set on the command line. Flags only ever switch things off, so
/// unset fields leave lower layers alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minify: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v8cache: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub babel: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integrity: Option<IntegrityPolicy>,
}

impl From<&BuildArgs> for ConfigOverrides {
    fn from(args: &BuildArgs) -> Self {
        let off = |flag: bool| flag.then_some(false);
        Self {
            minify: off(args.no_minify),
            v8cache: off(args.no_v8cache),
            cache: off(args.no_cache),
            babel: off(args.no_babel),
            integrity: args.strict_assets.then_some(IntegrityPolicy::Deny),
        }
    }
}

impl DistpackConfig {
    /// Load configuration from multiple sources.
    /// Priority: CLI args > environment variables > config file > defaults
    pub fn load(
        project: &ProjectArgs,
        overrides: &ConfigOverrides,
        project_root: &Path,
    ) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default_config()));

        if let Some(path) = Self::config_file(project, project_root)? {
            figment = figment.merge(Json::file(path));
        }

        // DISTPACK_OUT_DIR -> outDir, DISTPACK_BUNDLER__COMMAND -> bundler.command
        figment = figment.merge(
            Env::prefixed("DISTPACK_")
                .lowercase(false)
                .map(|key| env_key_to_field(key.as_str()).into()),
        );

        figment = figment.merge(Serialized::defaults(overrides));

        figment
            .extract()
            .map_err(|e| ConfigError::Load(e.to_string()).into())
    }

    /// The config file to read: `--config` when given (and it must exist),
    /// otherwise `distpack.config.json` in the project root if present.
    fn config_file(project: &ProjectArgs, project_root: &Path) -> Result<Option<PathBuf>> {
        match &project.config {
            Some(explicit) => {
                let cwd = std::env::current_dir()?;
                let path = resolve_path(explicit, &cwd);
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path).into());
                }
                Ok(Some(path))
            }
            None => {
                let path = project_root.join(CONFIG_FILE_NAME);
                Ok(path.is_file().then_some(path))
            }
        }
    }

    /// Defaults for every field.
    pub(crate) fn default_config() -> Self {
        use crate::config::defaults::*;

        Self {
            out_dir: default_out_dir(),
            clean_dir: default_clean_dir(),
            minify: true,
            v8cache: true,
            cache: true,
            cache_dir: default_cache_dir(),
            babel: true,
            integrity: IntegrityPolicy::Warn,
            bundler: Default::default(),
            manifest: None,
        }
    }
}

/// Map an environment key (prefix already stripped) to a config path:
/// `__` separates nesting levels and `_` separates camelCase words.
pub(crate) fn env_key_to_field(key: &str) -> String {
    key.split("__")
        .map(|segment| {
            let mut field = String::with_capacity(segment.len());
            for (i, word) in segment.split('_').filter(|w| !w.is_empty()).enumerate() {
                let word = word.to_ascii_lowercase();
                if i == 0 {
                    field.push_str(&word);
                } else {
                    let mut chars = word.chars();
                    if let Some(first) = chars.next() {
                        field.push(first.to_ascii_uppercase());
                        field.push_str(chars.as_str());
                    }
                }
            }
            field
        })
        .collect::<Vec<_>>()
        .join(".")
}
