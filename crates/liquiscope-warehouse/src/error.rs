use std::fmt::Display;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while reading the cache.
#[derive(Debug, Error)]
pub enum WarehouseError {
    /// The cache store could not be opened or queried.
    #[error("cache unavailable at {path}: {reason}")]
    CacheUnavailable { path: PathBuf, reason: String },

    /// Table name is not a plain SQL identifier.
    #[error("invalid cache table name '{0}'")]
    InvalidTable(String),
}

impl WarehouseError {
    pub(crate) fn unavailable(path: &Path, reason: impl Display) -> Self {
        Self::CacheUnavailable {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}
