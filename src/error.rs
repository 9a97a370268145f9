use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure loading a [`crate::config::FloaterConfig`] from disk.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Failure reading or writing persisted floater rectangles.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("rect store I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("rect store is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
