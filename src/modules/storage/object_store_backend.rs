//! S3-compatible adapter for the remote file backend
//!
//! The storage channel's files are mirrored into a bucket, one object per
//! message at `<prefix>/<channel_id>/<message_id>`. Object metadata carries
//! the original filename (`x-amz-meta-filename`) and, for videos, the
//! duration in seconds (`x-amz-meta-duration`).
//!
//! Uses rust-s3; chunks are pulled with ranged GETs, one request per chunk.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use s3::creds::Credentials;
use s3::{Bucket, Region};
use tracing::{debug, info};

use crate::core::config::StorageConfig;
use crate::core::error::AppError;
use crate::modules::storage::{ChunkBackend, ChunkStream, FileDescriptor, FileProperties};

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Remote backend served from an S3-compatible bucket
pub struct ObjectStoreBackend {
    bucket: Arc<Bucket>,
    message_prefix: String,
    channel_id: String,
}

impl ObjectStoreBackend {
    /// Create a new backend from configuration
    pub fn new(config: StorageConfig) -> Result<Self, AppError> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Internal(format!("Failed to create storage credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| AppError::Internal(format!("Failed to create storage bucket: {}", e)))?;

        // Use path-style URLs (http://endpoint/bucket instead of http://bucket.endpoint)
        bucket.set_path_style();

        info!(
            "Object store backend initialized for endpoint: {}, bucket: {}, channel: {}",
            config.endpoint,
            bucket.name(),
            config.channel_id
        );

        Ok(Self {
            bucket: Arc::from(bucket),
            message_prefix: config.message_prefix,
            channel_id: config.channel_id,
        })
    }

    /// Object key holding the file of a channel message
    pub fn message_key(&self, message_id: i64) -> String {
        format!(
            "{}/{}/{}",
            self.message_prefix.trim_end_matches('/'),
            self.channel_id,
            message_id
        )
    }

    async fn head(
        &self,
        key: &str,
    ) -> Result<Option<s3::serde_types::HeadObjectResult>, AppError> {
        let (head, status) = self
            .bucket
            .head_object(key)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to stat object '{}': {}", key, e)))?;

        match status {
            200..=299 => Ok(Some(head)),
            404 => Ok(None),
            other => Err(AppError::Internal(format!(
                "Unexpected status {} while stating object '{}'",
                other, key
            ))),
        }
    }
}

/// Metadata lookup tolerant of whether the `x-amz-meta-` prefix was stripped
fn metadata_value<'a>(metadata: Option<&'a HashMap<String, String>>, name: &str) -> Option<&'a str> {
    let metadata = metadata?;
    metadata
        .get(name)
        .or_else(|| metadata.get(&format!("x-amz-meta-{}", name)))
        .map(String::as_str)
        .filter(|v| !v.is_empty())
}

/// Extract `filename="..."` from a Content-Disposition value
fn disposition_filename(disposition: &str) -> Option<String> {
    disposition.split(';').find_map(|part| {
        part.trim()
            .strip_prefix("filename=")
            .map(|name| name.trim_matches('"').to_string())
            .filter(|name| !name.is_empty())
    })
}

#[async_trait]
impl ChunkBackend for ObjectStoreBackend {
    async fn resolve_file_descriptor(
        &self,
        message_id: i64,
    ) -> Result<Option<FileDescriptor>, AppError> {
        let key = self.message_key(message_id);
        let found = self.head(&key).await?.is_some();
        debug!("Resolved message {} -> '{}' (found={})", message_id, key, found);

        Ok(found.then_some(FileDescriptor {
            message_id,
            location: key,
        }))
    }

    async fn get_file_properties(
        &self,
        descriptor: &FileDescriptor,
    ) -> Result<FileProperties, AppError> {
        let head = self.head(&descriptor.location).await?.ok_or_else(|| {
            AppError::NotFound(format!("Message {} not found", descriptor.message_id))
        })?;

        let size = head
            .content_length
            .and_then(|len| u64::try_from(len).ok())
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "Object '{}' has no content length",
                    descriptor.location
                ))
            })?;

        let metadata = head.metadata.as_ref();
        let filename = metadata_value(metadata, "filename")
            .map(str::to_string)
            .or_else(|| {
                head.content_disposition
                    .as_deref()
                    .and_then(disposition_filename)
            })
            .unwrap_or_else(|| descriptor.message_id.to_string());

        let duration = metadata_value(metadata, "duration").and_then(|d| d.parse::<i32>().ok());

        let mime_type = head
            .content_type
            .clone()
            .filter(|ct| !ct.is_empty())
            .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());

        Ok(FileProperties {
            filename,
            size,
            mime_type,
            duration,
        })
    }

    fn fetch_chunk_stream(
        &self,
        descriptor: &FileDescriptor,
        offset: u64,
        chunk_size: u64,
    ) -> ChunkStream {
        let bucket = Arc::clone(&self.bucket);
        let key = descriptor.location.clone();

        Box::pin(stream::try_unfold(offset, move |position| {
            let bucket = Arc::clone(&bucket);
            let key = key.clone();
            async move {
                let end = position + chunk_size - 1;
                let response = bucket
                    .get_object_range(&key, position, Some(end))
                    .await
                    .map_err(|e| {
                        AppError::Internal(format!(
                            "Failed to fetch '{}' bytes {}-{}: {}",
                            key, position, end, e
                        ))
                    })?;

                match response.status_code() {
                    200..=299 => {}
                    // Offset at or past the end of the object
                    416 => return Ok(None),
                    other => {
                        return Err(AppError::Internal(format!(
                            "Unexpected status {} fetching '{}' at offset {}",
                            other, key, position
                        )))
                    }
                }

                let chunk = Bytes::from(response.to_vec());
                if chunk.is_empty() {
                    return Ok(None);
                }
                let next = position + chunk.len() as u64;
                Ok(Some((chunk, next)))
            }
        }))
    }
}
