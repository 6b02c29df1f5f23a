use std::path::PathBuf;

use thiserror::Error;

/// Disk failure inside a cache. Never returned from the public cache API.
#[derive(Error, Debug)]
pub enum CacheIoError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl CacheIoError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CacheIoError::Io {
            path: path.into(),
            source,
        }
    }
}
