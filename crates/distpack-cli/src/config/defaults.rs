use std::path::PathBuf;

use distpack_pipeline::pipeline::{DEFAULT_CLEAN_DIR, DEFAULT_OUT_DIR};

pub fn default_out_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUT_DIR)
}

pub fn default_clean_dir() -> PathBuf {
    PathBuf::from(DEFAULT_CLEAN_DIR)
}

pub fn default_cache_dir() -> PathBuf {
    PathBuf::from(".cache")
}

pub fn default_enabled() -> bool {
    true
}

pub fn default_bundler_command() -> Vec<String> {
    vec!["node".to_string(), "scripts/bundle.js".to_string()]
}
