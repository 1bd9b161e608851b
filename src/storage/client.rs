use std::time::Duration;

use async_trait::async_trait;

use crate::error::AppError;

/// `DeleteObjects` accepts at most 1000 keys per call.
const DELETE_OBJECTS_LIMIT: usize = 1000;

/// Trait for blob storage operations (S3-compatible).
///
/// Abstracted as a trait so tests can use a mock without a real S3 instance.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Issue a time-limited URL that allows a single PUT of `key` with `content_type`.
    async fn presign_upload(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<String, AppError>;

    /// Delete the given objects. An empty list is a no-op; missing keys are not an error.
    async fn delete_objects(&self, keys: &[String]) -> Result<(), AppError>;
}

/// S3 implementation of StorageClient.
pub struct S3StorageClient {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3StorageClient {
    pub fn new(client: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl StorageClient for S3StorageClient {
    async fn presign_upload(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<String, AppError> {
        use aws_sdk_s3::presigning::PresigningConfig;

        let presigning = PresigningConfig::expires_in(expires_in)
            .map_err(|e| AppError::Storage(format!("Invalid presigning config: {e}")))?;

        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(presigning)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to presign '{}': {}", key, e)))?;

        Ok(request.uri().to_string())
    }

    async fn delete_objects(&self, keys: &[String]) -> Result<(), AppError> {
        use aws_sdk_s3::types::{Delete, ObjectIdentifier};

        for chunk in keys.chunks(DELETE_OBJECTS_LIMIT) {
            let objects = chunk
                .iter()
                .map(|key| {
                    ObjectIdentifier::builder()
                        .key(key)
                        .build()
                        .map_err(|e| AppError::Storage(format!("Invalid object key '{}': {}", key, e)))
                })
                .collect::<Result<Vec<_>, _>>()?;

            let delete = Delete::builder()
                .set_objects(Some(objects))
                .quiet(true)
                .build()
                .map_err(|e| AppError::Storage(format!("Invalid delete request: {e}")))?;

            let output = self
                .client
                .delete_objects()
                .bucket(&self.bucket)
                .delete(delete)
                .send()
                .await
                .map_err(|e| {
                    AppError::Storage(format!(
                        "Failed to delete {} objects: {}",
                        chunk.len(),
                        e.into_service_error()
                    ))
                })?;

            // Per-key failures come back in the body of a successful response
            let failed: Vec<String> = output
                .errors()
                .iter()
                .map(|err| {
                    format!(
                        "{} ({})",
                        err.key().unwrap_or("?"),
                        err.code().unwrap_or("unknown")
                    )
                })
                .collect();

            if !failed.is_empty() {
                return Err(AppError::Storage(format!(
                    "Failed to delete objects: {}",
                    failed.join(", ")
                )));
            }
        }

        Ok(())
    }
}
