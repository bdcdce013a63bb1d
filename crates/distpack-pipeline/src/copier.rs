//! Copies of files that never pass through the bundler.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::writer::{ArtifactSpec, ArtifactWriter, WrittenArtifact};
use crate::{Error, FsOp, Result};

/// Copies helper files and file trees into the output through an
/// [`ArtifactWriter`], so copies obey the same path confinement as bundled
/// code.
#[derive(Debug, Clone)]
pub struct AuxiliaryAssetCopier {
    writer: ArtifactWriter,
}

impl AuxiliaryAssetCopier {
    pub fn new(writer: ArtifactWriter) -> Self {
        Self { writer }
    }

    /// Copy `source` byte-for-byte to `destination`.
    ///
    /// Relative paths resolve against the writer's root.
    ///
    /// # Errors
    ///
    /// [`Error::FileSystem`] with [`FsOp::Read`] when the source is missing
    /// or unreadable, or any error from [`ArtifactWriter::write`].
    pub fn copy_file(&self, source: &Path, destination: &Path) -> Result<WrittenArtifact> {
        let source = self.writer.root().join(source);
        let bytes = fs::read(&source).map_err(|e| Error::fs(FsOp::Read, &source, e))?;

        let written = self
            .writer
            .write(ArtifactSpec::owned(destination, bytes))?
            .ok_or_else(|| Error::InvalidOutputPath(destination.display().to_string()))?;

        debug!(from = %source.display(), to = %written.path.display(), "copied file");
        Ok(written)
    }

    /// Copy every file matching `pattern` into `destination_dir`, keeping
    /// file names. Matches are copied in sorted path order.
    ///
    /// A pattern matching nothing copies nothing.
    ///
    /// # Errors
    ///
    /// [`Error::Glob`] for a malformed pattern, otherwise as
    /// [`copy_file`](Self::copy_file).
    pub fn copy_tree(&self, pattern: &str, destination_dir: &Path) -> Result<Vec<WrittenArtifact>> {
        // The root is a literal path; only `pattern` may carry glob syntax.
        let root = glob::Pattern::escape(&self.writer.root().to_string_lossy());
        let absolute = Path::new(&root).join(pattern);
        let absolute = absolute.to_string_lossy();

        let paths = glob::glob(&absolute).map_err(|e| Error::Glob(format!("'{pattern}': {e}")))?;

        let mut sources: Vec<PathBuf> = Vec::new();
        for entry in paths {
            let path = entry.map_err(|e| {
                let path = e.path().to_path_buf();
                Error::fs(FsOp::Read, path, e.into_error())
            })?;
            if path.is_file() {
                sources.push(path);
            }
        }
        sources.sort();

        if sources.is_empty() {
            debug!(pattern, "tree copy matched no files");
            return Ok(Vec::new());
        }

        let mut written = Vec::with_capacity(sources.len());
        for source in &sources {
            let Some(file_name) = source.file_name() else {
                continue;
            };
            written.push(self.copy_file(source, &destination_dir.join(file_name))?);
        }

        debug!(pattern, copied = written.len(), "copied tree");
        Ok(written)
    }
}
