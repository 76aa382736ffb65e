use crate::ports::storage::{StorageError, StoragePort};
use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;
use std::path::Path;
use tokio::io::BufWriter;
use tracing::info;

/// S3Adapter implements StoragePort for a single S3 bucket.
#[derive(Clone)]
pub struct S3Adapter {
    client: Client,
    bucket: String,
}

impl S3Adapter {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl StoragePort for S3Adapter {
    async fn download(&self, key: &str, local_path: &Path) -> Result<(), StorageError> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let service_error = e.into_service_error();
                if service_error.is_no_such_key() {
                    StorageError::NotFound {
                        bucket: self.bucket.clone(),
                        key: key.to_string(),
                    }
                } else {
                    StorageError::Download {
                        bucket: self.bucket.clone(),
                        key: key.to_string(),
                        message: DisplayErrorContext(&service_error).to_string(),
                    }
                }
            })?;

        let mut body = resp.body.into_async_read();
        let mut file = BufWriter::new(tokio::fs::File::create(local_path).await?);
        tokio::io::copy(&mut body, &mut file).await?;
        tokio::io::AsyncWriteExt::flush(&mut file).await?;

        info!(
            "s3://{}/{} downloaded to {}",
            self.bucket,
            key,
            local_path.display()
        );
        Ok(())
    }

    async fn upload(&self, local_path: &Path, key: &str) -> Result<(), StorageError> {
        let upload_failed = |message: String| StorageError::Upload {
            bucket: self.bucket.clone(),
            key: key.to_string(),
            message,
        };

        let body = ByteStream::from_path(local_path)
            .await
            .map_err(|e| upload_failed(e.to_string()))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|e| upload_failed(DisplayErrorContext(&e).to_string()))?;

        info!("{} uploaded to {}", key, self.bucket);
        Ok(())
    }

    async fn make_public(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .put_object_acl()
            .bucket(&self.bucket)
            .key(key)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| StorageError::Publish {
                bucket: self.bucket.clone(),
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        info!("s3://{}/{} is now public", self.bucket, key);
        Ok(())
    }
}
