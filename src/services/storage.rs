use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, Region};
use std::path::{Path, PathBuf};

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Object storage the photos are uploaded to.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Upload the file at `local_path` under `key`.
    async fn upload_file(&self, local_path: &Path, key: &str) -> Result<(), StorageError>;
}

/// Client for S3-compatible object storage.
pub struct S3Storage {
    bucket: Box<Bucket>,
}

impl S3Storage {
    /// Build a bucket handle. Without explicit keys the default AWS credential chain
    /// (environment, profile, instance metadata) is used.
    pub fn new(
        bucket_name: &str,
        region_name: &str,
        endpoint: Option<&str>,
        access_key: Option<&str>,
        secret_key: Option<&str>,
    ) -> Result<Self, StorageError> {
        let region = match endpoint {
            Some(endpoint) => Region::Custom {
                region: region_name.to_string(),
                endpoint: endpoint.to_string(),
            },
            None => region_name
                .parse::<Region>()
                .map_err(|e| StorageError::Config(e.to_string()))?,
        };

        let credentials = Credentials::new(access_key, secret_key, None, None, None)
            .map_err(|e| StorageError::Config(e.to_string()))?;

        let mut bucket = Bucket::new(bucket_name, region, credentials)
            .map_err(|e| StorageError::Config(e.to_string()))?;
        if endpoint.is_some() {
            bucket = bucket.with_path_style();
        }

        Ok(Self { bucket })
    }

    /// Upload raw bytes with an explicit content type.
    pub async fn upload(&self, key: &str, data: &[u8], content_type: &str) -> Result<(), StorageError> {
        let response = self
            .bucket
            .put_object_with_content_type(key, data, content_type)
            .await
            .map_err(StorageError::S3)?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(StorageError::Status {
                key: key.to_string(),
                status,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for S3Storage {
    async fn upload_file(&self, local_path: &Path, key: &str) -> Result<(), StorageError> {
        let data = tokio::fs::read(local_path).await.map_err(StorageError::Io)?;
        let content_type = content_type_for(&data);

        self.upload(key, &data, content_type).await?;

        tracing::info!(key, bytes = data.len(), content_type, "Photo uploaded");
        Ok(())
    }
}

/// MIME type sniffed from the image header.
pub fn content_type_for(data: &[u8]) -> &'static str {
    image::guess_format(data)
        .map(|format| format.to_mime_type())
        .unwrap_or(FALLBACK_CONTENT_TYPE)
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("S3 operation failed: {0}")]
    S3(#[from] s3::error::S3Error),

    #[error("Upload of {key} rejected with HTTP {status}")]
    Status { key: String, status: u16 },

    #[error("No file name in {}", .0.display())]
    MissingFileName(PathBuf),

    #[error("Failed to read local file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage configuration error: {0}")]
    Config(String),
}
