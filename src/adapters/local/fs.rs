use crate::ports::storage::{StorageError, StoragePort};
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

/// Object storage emulated on the local filesystem: object `key` of a bucket
/// lives at `<bucket_dir>/<key>`.
#[derive(Clone, Debug)]
pub struct FsAdapter {
    bucket: String,
    bucket_dir: PathBuf,
}

impl FsAdapter {
    /// Bucket `bucket` stored under `root/bucket`.
    pub fn new(root: impl AsRef<Path>, bucket: impl Into<String>) -> Self {
        let bucket = bucket.into();
        Self {
            bucket_dir: root.as_ref().join(&bucket),
            bucket,
        }
    }

    pub fn object_path(&self, key: &str) -> PathBuf {
        self.bucket_dir.join(key)
    }
}

#[async_trait]
impl StoragePort for FsAdapter {
    async fn download(&self, key: &str, local_path: &Path) -> Result<(), StorageError> {
        let object_path = self.object_path(key);
        match tokio::fs::copy(&object_path, local_path).await {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound && !object_path.exists() => {
                return Err(StorageError::NotFound {
                    bucket: self.bucket.clone(),
                    key: key.to_string(),
                })
            }
            Err(e) => {
                return Err(StorageError::Download {
                    bucket: self.bucket.clone(),
                    key: key.to_string(),
                    message: e.to_string(),
                })
            }
        }

        info!(
            "{}/{} downloaded to {}",
            self.bucket,
            key,
            local_path.display()
        );
        Ok(())
    }

    async fn upload(&self, local_path: &Path, key: &str) -> Result<(), StorageError> {
        let object_path = self.object_path(key);
        if let Some(parent) = object_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(local_path, &object_path)
            .await
            .map_err(|e| StorageError::Upload {
                bucket: self.bucket.clone(),
                key: key.to_string(),
                message: e.to_string(),
            })?;

        info!("{} uploaded to {}", key, self.bucket);
        Ok(())
    }

    async fn make_public(&self, key: &str) -> Result<(), StorageError> {
        let object_path = self.object_path(key);
        let publish_failed = |e: io::Error| StorageError::Publish {
            bucket: self.bucket.clone(),
            key: key.to_string(),
            message: e.to_string(),
        };

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&object_path, std::fs::Permissions::from_mode(0o644))
                .await
                .map_err(publish_failed)?;
        }
        #[cfg(not(unix))]
        {
            tokio::fs::metadata(&object_path)
                .await
                .map_err(publish_failed)?;
        }

        info!("{}/{} is now public", self.bucket, key);
        Ok(())
    }
}
