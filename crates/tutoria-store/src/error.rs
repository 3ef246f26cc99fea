//! Store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by listing stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The data directory exists but is not a directory.
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Reading or writing a listing file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}
