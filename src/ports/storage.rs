use async_trait::async_trait;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object {bucket}/{key} not found")]
    NotFound { bucket: String, key: String },

    #[error("failed to download {bucket}/{key}: {message}")]
    Download {
        bucket: String,
        key: String,
        message: String,
    },

    #[error("failed to upload {bucket}/{key}: {message}")]
    Upload {
        bucket: String,
        key: String,
        message: String,
    },

    #[error("failed to make {bucket}/{key} public: {message}")]
    Publish {
        bucket: String,
        key: String,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// One bucket of object storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoragePort: Send + Sync {
    /// Download object `key` to `local_path`, replacing any existing file
    async fn download(&self, key: &str, local_path: &Path) -> Result<(), StorageError>;

    /// Upload the file at `local_path` as object `key`. Resolves once the object is stored.
    async fn upload(&self, local_path: &Path, key: &str) -> Result<(), StorageError>;

    /// Make object `key` readable by anyone
    async fn make_public(&self, key: &str) -> Result<(), StorageError>;
}
