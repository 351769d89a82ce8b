use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::core::error::AppError;

/// Handle on a file held by the remote backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    /// Message id of the file inside the storage channel
    pub message_id: i64,
    /// Backend-specific location (object key, file reference, ...)
    pub location: String,
}

/// Authoritative properties of a remote file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileProperties {
    pub filename: String,
    pub size: u64,
    pub mime_type: String,
    /// Video duration in seconds, when the backend knows it
    pub duration: Option<i32>,
}

/// Lazy, forward-only sequence of chunks starting at a chunk-aligned offset.
///
/// Every item except possibly the last one is exactly `chunk_size` bytes long.
/// An empty item or the end of the stream means the file has no more data.
pub type ChunkStream = BoxStream<'static, Result<Bytes, AppError>>;

/// Capability interface over the messaging platform's file storage
#[async_trait]
pub trait ChunkBackend: Send + Sync {
    /// Look up the file attached to a channel message; `None` when the message is gone
    async fn resolve_file_descriptor(
        &self,
        message_id: i64,
    ) -> Result<Option<FileDescriptor>, AppError>;

    /// Current filename, size and MIME type of the file
    async fn get_file_properties(
        &self,
        descriptor: &FileDescriptor,
    ) -> Result<FileProperties, AppError>;

    /// Start pulling chunks at `offset` (a multiple of `chunk_size`).
    ///
    /// Nothing is fetched until the stream is polled, and dropping the stream
    /// stops any further fetches.
    fn fetch_chunk_stream(
        &self,
        descriptor: &FileDescriptor,
        offset: u64,
        chunk_size: u64,
    ) -> ChunkStream;
}
