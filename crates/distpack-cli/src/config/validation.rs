use std::path::{Component, Path};

use crate::config::DistpackConfig;
use crate::error::{ConfigError, Result};

/// Whether `path` is relative and never climbs above its base.
fn stays_inside(path: &Path) -> bool {
    let mut depth = 0usize;
    for component in path.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return false;
                }
                depth -= 1;
            }
            Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    depth > 0
}

impl DistpackConfig {
    /// Validate configuration for logical consistency.
    pub fn validate(&self) -> Result<()> {
        match self.bundler.command.first() {
            None => {
                return Err(ConfigError::MissingField {
                    field: "bundler.command".to_string(),
                    hint: "Provide the program that bundles one entry, e.g. [\"node\", \"scripts/bundle.js\"]".to_string(),
                }
                .into())
            }
            Some(program) if program.trim().is_empty() => {
                return Err(ConfigError::InvalidValue {
                    field: "bundler.command".to_string(),
                    value: format!("{:?}", self.bundler.command),
                    hint: "The first element must name a program".to_string(),
                }
                .into())
            }
            Some(_) => {}
        }

        for (field, dir) in [("outDir", &self.out_dir), ("cleanDir", &self.clean_dir)] {
            if !stays_inside(dir) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: dir.display().to_string(),
                    hint: format!("{field} must be a relative directory inside the project"),
                }
                .into());
            }
        }

        if let Some(manifest) = &self.manifest {
            manifest.validate().map_err(|e| ConfigError::InvalidValue {
                field: "manifest".to_string(),
                value: e.to_string(),
                hint: "Each target needs a unique name and a unique relative output path".to_string(),
            })?;
        }

        Ok(())
    }
}
