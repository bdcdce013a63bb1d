//! Scoped file materialisation for build artifacts.
//!
//! Every file the pipeline produces goes through [`ArtifactWriter::write`]:
//! bundled code, staged assets and verbatim helper copies alike.
//!
//! # Guarantees
//!
//! - An absent payload is a silent no-op: no directory is created and no file
//!   is touched.
//! - Parent directories are created with `mkdir -p` semantics.
//! - The payload replaces the whole file; existing files are overwritten.
//! - Explicit permission bits win over the [`FileMode`]; on non-unix targets
//!   both are ignored.
//! - Destinations are normalised and must stay inside the writer's root, so a
//!   manifest entry like `../../etc/passwd` is rejected before any I/O.
//!
//! No rollback is attempted on failure. The next run's clean step is the
//! recovery path for a half-written tree.

use std::borrow::Cow;
use std::fs;
use std::path::{Component, Path, PathBuf};

use path_clean::PathClean;
use tracing::debug;

use crate::{Error, FsOp, Result};

/// Permission mode applied to a written file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileMode {
    /// Whatever the process umask yields for a new file.
    #[default]
    Default,
    /// `rwxr-xr-x`, for entry scripts run directly.
    Executable,
}

impl FileMode {
    /// Unix permission bits for this mode, if it sets any.
    pub fn unix_bits(self) -> Option<u32> {
        match self {
            FileMode::Default => None,
            FileMode::Executable => Some(0o755),
        }
    }
}

/// One requested write.
#[derive(Debug, Clone)]
pub struct ArtifactSpec<'a> {
    pub destination: PathBuf,
    pub payload: Option<Cow<'a, [u8]>>,
    pub mode: FileMode,
    /// Explicit unix permission bits; take precedence over `mode`.
    pub permissions: Option<u32>,
}

impl<'a> ArtifactSpec<'a> {
    pub fn new(destination: impl Into<PathBuf>, payload: Option<&'a [u8]>) -> Self {
        Self {
            destination: destination.into(),
            payload: payload.map(Cow::Borrowed),
            mode: FileMode::Default,
            permissions: None,
        }
    }

    pub fn owned(destination: impl Into<PathBuf>, payload: Vec<u8>) -> Self {
        Self {
            destination: destination.into(),
            payload: Some(Cow::Owned(payload)),
            mode: FileMode::Default,
            permissions: None,
        }
    }

    pub fn mode(mut self, mode: FileMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn permissions(mut self, bits: Option<u32>) -> Self {
        self.permissions = bits;
        self
    }
}

/// A file that was actually written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenArtifact {
    pub path: PathBuf,
    pub size: u64,
}

/// Writes artifacts beneath a root directory.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    root: PathBuf,
}

impl ArtifactWriter {
    /// Create a writer confined to `root`. Relative destinations are resolved
    /// against it.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into().clean(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Materialise `spec`.
    ///
    /// Returns `Ok(None)` without touching the filesystem when the payload is
    /// absent.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidOutputPath`] if the destination escapes the root
    /// - [`Error::FileSystem`] if directory creation, the write, or the
    ///   permission change fails
    pub fn write(&self, spec: ArtifactSpec<'_>) -> Result<Option<WrittenArtifact>> {
        let Some(payload) = spec.payload else {
            debug!(path = %spec.destination.display(), "skipping absent payload");
            return Ok(None);
        };

        let target = self.validate_destination(&spec.destination)?;

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::fs(FsOp::CreateDir, parent, e))?;
        }

        fs::write(&target, &payload).map_err(|e| Error::fs(FsOp::Write, &target, e))?;
        apply_mode(&target, spec.permissions.or(spec.mode.unix_bits()))?;

        debug!(path = %target.display(), bytes = payload.len(), "wrote artifact");

        Ok(Some(WrittenArtifact {
            path: target,
            size: payload.len() as u64,
        }))
    }

    /// Normalise a destination and check that it stays under the root.
    fn validate_destination(&self, destination: &Path) -> Result<PathBuf> {
        if destination.as_os_str().is_empty() {
            return Err(Error::InvalidOutputPath("destination is empty".to_string()));
        }

        if destination.to_string_lossy().contains('\0') {
            return Err(Error::InvalidOutputPath(
                "destination contains null byte".to_string(),
            ));
        }

        let escapes = || {
            Error::InvalidOutputPath(format!(
                "'{}' escapes '{}'",
                destination.display(),
                self.root.display()
            ))
        };

        let relative = if destination.is_absolute() {
            destination
                .clean()
                .strip_prefix(&self.root)
                .map_err(|_| escapes())?
                .to_path_buf()
        } else {
            destination.clean()
        };

        let inside = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !inside || relative.as_os_str().is_empty() {
            return Err(escapes());
        }

        Ok(self.root.join(relative))
    }
}

#[cfg(unix)]
fn apply_mode(path: &Path, bits: Option<u32>) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    if let Some(bits) = bits {
        fs::set_permissions(path, fs::Permissions::from_mode(bits))
            .map_err(|e| Error::fs(FsOp::SetPermissions, path, e))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn apply_mode(_path: &Path, _bits: Option<u32>) -> Result<()> {
    Ok(())
}
