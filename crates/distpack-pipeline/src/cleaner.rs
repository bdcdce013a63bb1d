//! Removal of stale build artifacts before a run.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::{Error, FsOp, Result};

/// A class of build artifact, matched by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanRule {
    /// `.js`
    Code,
    /// `.cache`
    Cache,
    /// `.ts`
    TypeDeclaration,
    /// `.txt`
    Text,
}

impl CleanRule {
    pub const ALL: [CleanRule; 4] = [
        CleanRule::Code,
        CleanRule::Cache,
        CleanRule::TypeDeclaration,
        CleanRule::Text,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            CleanRule::Code => "js",
            CleanRule::Cache => "cache",
            CleanRule::TypeDeclaration => "ts",
            CleanRule::Text => "txt",
        }
    }

    pub fn matches(self, path: &Path) -> bool {
        path.extension()
            .is_some_and(|ext| ext == self.extension())
    }
}

/// Deletes every file under a root that matches one of its rules.
///
/// Only files are removed; the directory skeleton is left in place and
/// symlinks are never followed, so nothing outside the root is touched.
#[derive(Debug, Clone)]
pub struct OutputCleaner {
    root: PathBuf,
    rules: Vec<CleanRule>,
}

impl OutputCleaner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            rules: CleanRule::ALL.to_vec(),
        }
    }

    pub fn with_rules(mut self, rules: impl IntoIterator<Item = CleanRule>) -> Self {
        self.rules = rules.into_iter().collect();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Remove matching files, returning the paths that were deleted.
    ///
    /// A missing root is treated as an already-clean tree.
    ///
    /// # Errors
    ///
    /// Any walk or deletion failure is returned as [`Error::FileSystem`]; the
    /// caller must not continue building on a tree that may still hold stale
    /// output.
    pub fn clean(&self) -> Result<Vec<PathBuf>> {
        if !self.root.exists() {
            debug!(root = %self.root.display(), "clean root does not exist");
            return Ok(Vec::new());
        }

        let mut removed = Vec::new();

        for entry in WalkDir::new(&self.root).follow_links(false) {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(&self.root).to_path_buf();
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| io::Error::other("filesystem loop detected"));
                Error::fs(FsOp::Walk, path, source)
            })?;

            if !entry.file_type().is_file() || !self.is_artifact(entry.path()) {
                continue;
            }

            fs::remove_file(entry.path()).map_err(|e| Error::fs(FsOp::Remove, entry.path(), e))?;
            removed.push(entry.into_path());
        }

        info!(
            root = %self.root.display(),
            removed = removed.len(),
            "cleaned previous build output"
        );

        Ok(removed)
    }

    fn is_artifact(&self, path: &Path) -> bool {
        self.rules.iter().any(|rule| rule.matches(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, relative).unwrap();
    }

    #[test]
    fn test_clean_removes_matching_files() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("dist");
        touch(&root, "ncc/cli.js");
        touch(&root, "ncc/cli.js.cache");
        touch(&root, "ncc/LICENSES.txt");
        touch(&root, "ncc/loaders/typescript/lib/lib.d.ts");
        touch(&root, "ncc/keep.json");

        let mut removed = OutputCleaner::new(&root).clean().unwrap();
        removed.sort();

        assert_eq!(removed.len(), 4);
        assert!(root.join("ncc/keep.json").exists());
        assert!(!root.join("ncc/cli.js").exists());
        // Directories survive.
        assert!(root.join("ncc/loaders/typescript/lib").is_dir());
    }

    #[test]
    fn test_clean_missing_root_is_noop() {
        let temp = TempDir::new().unwrap();
        let removed = OutputCleaner::new(temp.path().join("dist")).clean().unwrap();
        assert!(removed.is_empty());
        assert!(!temp.path().join("dist").exists());
    }

    #[test]
    fn test_clean_is_idempotent() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "index.js");
        touch(temp.path(), "index.js.cache");

        let cleaner = OutputCleaner::new(temp.path());
        assert_eq!(cleaner.clean().unwrap().len(), 2);
        assert!(cleaner.clean().unwrap().is_empty());
    }

    #[test]
    fn test_clean_respects_custom_rules() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "index.js");
        touch(temp.path(), "LICENSES.txt");

        let removed = OutputCleaner::new(temp.path())
            .with_rules([CleanRule::Text])
            .clean()
            .unwrap();

        assert_eq!(removed, vec![temp.path().join("LICENSES.txt")]);
        assert!(temp.path().join("index.js").exists());
    }

    #[test]
    fn test_rule_matches_final_extension_only() {
        assert!(CleanRule::Code.matches(Path::new("cli.js.cache.js")));
        assert!(CleanRule::Cache.matches(Path::new("cli.js.cache")));
        assert!(!CleanRule::Code.matches(Path::new("cli.json")));
        assert!(!CleanRule::TypeDeclaration.matches(Path::new("lib.tsx")));
    }

    #[cfg(unix)]
    #[test]
    fn test_clean_does_not_follow_symlinks() {
        let temp = TempDir::new().unwrap();
        let outside = temp.path().join("outside");
        touch(&outside, "precious.js");
        let root = temp.path().join("dist");
        fs::create_dir_all(&root).unwrap();
        std::os::unix::fs::symlink(&outside, root.join("link")).unwrap();

        OutputCleaner::new(&root).clean().unwrap();

        assert!(outside.join("precious.js").exists());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn file_name() -> impl Strategy<Value = String> {
            ("[a-z]{1,6}", prop::sample::select(vec!["js", "cache", "ts", "txt", "json", "map"]))
                .prop_map(|(stem, ext)| format!("{stem}.{ext}"))
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(32))]

            /// Property: exactly the rule-matching files go, the rest stay,
            /// and a second clean removes nothing.
            #[test]
            fn prop_clean_partitions_tree(
                files in prop::collection::btree_set(("[a-b]{0,1}", file_name()), 0..10),
            ) {
                let temp = TempDir::new().unwrap();
                let cleaner = OutputCleaner::new(temp.path());
                let mut expected_removed = 0;

                for (dir, name) in &files {
                    let relative = if dir.is_empty() { name.clone() } else { format!("{dir}/{name}") };
                    touch(temp.path(), &relative);
                    if cleaner.is_artifact(Path::new(name)) {
                        expected_removed += 1;
                    }
                }

                let removed = cleaner.clean().unwrap();
                prop_assert_eq!(removed.len(), expected_removed);
                for path in &removed {
                    prop_assert!(!path.exists());
                }
                prop_assert!(cleaner.clean().unwrap().is_empty());
            }
        }
    }
}
