//! Durable document archive. The uploaded PDF is copied here before the resume
//! record is written, so the transient upload file can always be deleted.

use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("S3 error: {0}")]
    S3(String),
}

#[async_trait]
pub trait DocumentArchive: Send + Sync {
    /// Stores `body` under `key` and returns the location recorded as `filePath`.
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<String, ArchiveError>;

    async fn remove(&self, key: &str) -> Result<(), ArchiveError>;
}

/// `resumes/<user_id>/<resume_id>.pdf`
pub fn resume_object_key(user_id: Uuid, resume_id: Uuid) -> String {
    format!("resumes/{user_id}/{resume_id}.pdf")
}

pub struct S3Archive {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Archive {
    /// Constructs an S3 client configured for MinIO (local) or AWS (production).
    pub async fn connect(config: &Config) -> Self {
        let credentials = Credentials::new(
            &config.aws_access_key_id,
            &config.aws_secret_access_key,
            None,
            None,
            "resume-api-static",
        );

        let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(credentials)
            .endpoint_url(&config.s3_endpoint)
            .load()
            .await;

        Self {
            client: aws_sdk_s3::Client::new(&s3_config),
            bucket: config.s3_bucket.clone(),
        }
    }
}

#[async_trait]
impl DocumentArchive for S3Archive {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<String, ArchiveError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| ArchiveError::S3(format!("upload failed: {e}")))?;

        info!("Archived document to s3://{}/{}", self.bucket, key);
        Ok(format!("s3://{}/{}", self.bucket, key))
    }

    async fn remove(&self, key: &str) -> Result<(), ArchiveError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| ArchiveError::S3(format!("delete failed: {e}")))?;
        Ok(())
    }
}
