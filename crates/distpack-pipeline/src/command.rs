//! A [`Bundler`] backed by an external program.
//!
//! The program is started once per target and speaks JSON over stdio.
//!
//! Request, written to stdin:
//!
//! ```json
//! { "entry": "/abs/src/cli", "options": { "filename": "cli.js", "minify": true, "v8cache": true,
//!   "cache": "/abs/.cache", "nobabel": false, "externals": ["./index.js"],
//!   "license": "LICENSES.txt", "noAssetBuilds": false } }
//! ```
//!
//! Response, read from stdout:
//!
//! ```json
//! { "code": "...", "assets": { "cli.js.cache": { "source": "<base64>", "permissions": 420 } } }
//! ```
//!
//! A non-zero exit status is a bundling failure; stderr becomes the
//! diagnostic.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::bundle::{Asset, BundleResult};
use crate::config::BuildConfig;
use crate::invoker::{Bundler, BundlerFailure};

#[derive(Serialize)]
struct BundleRequest<'a> {
    entry: &'a Path,
    options: &'a BuildConfig,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct BundleResponse {
    code: String,
    #[serde(default)]
    assets: BTreeMap<String, WireAsset>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct WireAsset {
    source: String,
    #[serde(default)]
    permissions: Option<u32>,
}

/// Runs a bundler bridge program per target.
#[derive(Debug, Clone)]
pub struct CommandBundler {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
}

impl CommandBundler {
    pub fn new<I, S>(program: impl Into<OsString>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
        }
    }

    /// Build from a command line such as `["node", "scripts/bundle.js"]`.
    ///
    /// Returns `None` for an empty command.
    pub fn from_command_line(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self::new(program, args))
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    fn display_command(&self) -> String {
        std::iter::once(&self.program)
            .chain(&self.args)
            .map(|part| part.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }

    async fn run(&self, request: &[u8]) -> Result<std::process::Output, BundlerFailure> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(cwd) = &self.cwd {
            command.current_dir(cwd);
        }

        let mut child = command.spawn().map_err(|e| {
            BundlerFailure::new(format!("failed to start `{}`: {e}", self.display_command()))
        })?;

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(request).await {
                // A bridge that exits without reading is judged by its exit status.
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {}
                Err(e) => {
                    return Err(BundlerFailure::new(format!(
                        "failed to send request to `{}`: {e}",
                        self.display_command()
                    )))
                }
                Ok(()) => {}
            }
        }

        child.wait_with_output().await.map_err(|e| {
            BundlerFailure::new(format!("failed to wait for `{}`: {e}", self.display_command()))
        })
    }
}

#[async_trait]
impl Bundler for CommandBundler {
    async fn bundle(&self, entry: &Path, config: &BuildConfig) -> Result<BundleResult, BundlerFailure> {
        let request = serde_json::to_vec(&BundleRequest {
            entry,
            options: config,
        })
        .map_err(|e| BundlerFailure::new(format!("failed to encode bundler request: {e}")))?;

        let output = self.run(&request).await?;
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            let diagnostic = stderr.trim();
            return Err(BundlerFailure::new(if diagnostic.is_empty() {
                format!("`{}` exited with {}", self.display_command(), output.status)
            } else {
                diagnostic.to_string()
            }));
        }

        if !stderr.trim().is_empty() {
            debug!(bundler = %self.display_command(), stderr = %stderr.trim(), "bundler stderr");
        }

        decode_response(&output.stdout)
    }

    fn name(&self) -> &str {
        "command"
    }
}

fn decode_response(stdout: &[u8]) -> Result<BundleResult, BundlerFailure> {
    let response: BundleResponse = serde_json::from_slice(stdout)
        .map_err(|e| BundlerFailure::new(format!("malformed bundler response: {e}")))?;

    let mut assets = BTreeMap::new();
    for (name, wire) in response.assets {
        let source = base64::engine::general_purpose::STANDARD
            .decode(wire.source.as_bytes())
            .map_err(|e| BundlerFailure::new(format!("asset '{name}' is not valid base64: {e}")))?;
        assets.insert(
            name,
            Asset {
                source,
                permissions: wire.permissions,
            },
        );
    }

    Ok(BundleResult {
        code: response.code.into_bytes(),
        assets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildSettings;
    use crate::target::BuildTarget;

    fn config() -> BuildConfig {
        BuildSettings::new().config_for(&BuildTarget::new("cli", "src/cli", "cli.js"))
    }

    #[test]
    fn test_decode_response() {
        let result = decode_response(
            br#"{"code":"module.exports = 1;","assets":{"cli.js.cache":{"source":"Y2FjaGU=","permissions":420}}}"#,
        )
        .unwrap();

        assert_eq!(result.code, b"module.exports = 1;");
        let asset = result.asset("cli.js.cache").unwrap();
        assert_eq!(asset.source, b"cache");
        assert_eq!(asset.permissions, Some(420));
    }

    #[test]
    fn test_decode_response_without_assets() {
        let result = decode_response(br#"{"code":""}"#).unwrap();
        assert!(result.assets.is_empty());
    }

    #[test]
    fn test_decode_rejects_bad_base64() {
        let err = decode_response(br#"{"code":"","assets":{"x":{"source":"***"}}}"#).unwrap_err();
        assert!(err.message.contains("asset 'x'"));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode_response(b"Error: something went wrong").unwrap_err();
        assert!(err.message.starts_with("malformed bundler response"));
    }

    #[test]
    fn test_from_command_line() {
        assert!(CommandBundler::from_command_line(&[]).is_none());
        let bundler =
            CommandBundler::from_command_line(&["node".to_string(), "scripts/bundle.js".to_string()])
                .unwrap();
        assert_eq!(bundler.display_command(), "node scripts/bundle.js");
    }

    #[tokio::test]
    async fn test_missing_program_is_a_failure() {
        let bundler = CommandBundler::new("distpack-definitely-not-a-program", Vec::<String>::new());
        let err = bundler.bundle(Path::new("/x"), &config()).await.unwrap_err();
        assert!(err.message.contains("failed to start"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_script_bridge_round_trip() {
        let temp = tempfile::TempDir::new().unwrap();
        let script = temp.path().join("bridge.sh");
        std::fs::write(
            &script,
            "cat > request.json\nprintf '%s' '{\"code\":\"bundled\",\"assets\":{\"cli.js.cache\":{\"source\":\"Y2FjaGU=\"}}}'\n",
        )
        .unwrap();

        let bundler = CommandBundler::new("sh", [&script]).current_dir(temp.path());
        let result = bundler
            .bundle(&temp.path().join("src/cli"), &config())
            .await
            .unwrap();

        assert_eq!(result.code, b"bundled");
        assert_eq!(result.asset_source("cli.js.cache"), Some(&b"cache"[..]));

        let request: serde_json::Value =
            serde_json::from_slice(&std::fs::read(temp.path().join("request.json")).unwrap()).unwrap();
        assert_eq!(request["options"]["filename"], "cli.js");
        assert!(request["entry"].as_str().unwrap().ends_with("src/cli"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_script_bridge_failure_uses_stderr() {
        let temp = tempfile::TempDir::new().unwrap();
        let script = temp.path().join("bridge.sh");
        std::fs::write(&script, "echo \"Module not found: ./nope\" >&2\nexit 1\n").unwrap();

        let bundler = CommandBundler::new("sh", [&script]);
        let err = bundler.bundle(Path::new("/x"), &config()).await.unwrap_err();

        assert_eq!(err.message, "Module not found: ./nope");
    }
}
