use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;

use crate::core::error::AppError;
use crate::modules::storage::{ChunkBackend, ChunkStream, FileDescriptor, FileProperties};

struct StoredFile {
    properties: FileProperties,
    content: Bytes,
}

/// In-memory backend that serves registered byte buffers in chunks and
/// counts every chunk it hands out.
#[derive(Default)]
pub struct MemoryChunkBackend {
    files: Mutex<HashMap<i64, StoredFile>>,
    fetched_chunks: Arc<AtomicUsize>,
    /// Fail the fetch of the n-th chunk (0-based) of every stream
    fail_at_chunk: Option<usize>,
}

impl MemoryChunkBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at_chunk(chunk: usize) -> Self {
        Self {
            fail_at_chunk: Some(chunk),
            ..Self::default()
        }
    }

    pub fn insert(&self, message_id: i64, filename: &str, mime_type: &str, content: Vec<u8>) {
        self.insert_with_duration(message_id, filename, mime_type, content, None);
    }

    pub fn insert_with_duration(
        &self,
        message_id: i64,
        filename: &str,
        mime_type: &str,
        content: Vec<u8>,
        duration: Option<i32>,
    ) {
        let properties = FileProperties {
            filename: filename.to_string(),
            size: content.len() as u64,
            mime_type: mime_type.to_string(),
            duration,
        };
        self.files.lock().unwrap().insert(
            message_id,
            StoredFile {
                properties,
                content: Bytes::from(content),
            },
        );
    }

    pub fn remove(&self, message_id: i64) {
        self.files.lock().unwrap().remove(&message_id);
    }

    /// Total number of chunks pulled across all streams
    pub fn fetched_chunks(&self) -> usize {
        self.fetched_chunks.load(Ordering::SeqCst)
    }
}

/// Deterministic content where every byte depends on its offset
pub fn patterned_content(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

#[async_trait]
impl ChunkBackend for MemoryChunkBackend {
    async fn resolve_file_descriptor(
        &self,
        message_id: i64,
    ) -> Result<Option<FileDescriptor>, AppError> {
        let found = self.files.lock().unwrap().contains_key(&message_id);
        Ok(found.then(|| FileDescriptor {
            message_id,
            location: format!("memory/{}", message_id),
        }))
    }

    async fn get_file_properties(
        &self,
        descriptor: &FileDescriptor,
    ) -> Result<FileProperties, AppError> {
        self.files
            .lock()
            .unwrap()
            .get(&descriptor.message_id)
            .map(|f| f.properties.clone())
            .ok_or_else(|| AppError::NotFound("Message not found".to_string()))
    }

    fn fetch_chunk_stream(
        &self,
        descriptor: &FileDescriptor,
        offset: u64,
        chunk_size: u64,
    ) -> ChunkStream {
        assert_eq!(offset % chunk_size, 0, "offset must be chunk-aligned");

        let content = self
            .files
            .lock()
            .unwrap()
            .get(&descriptor.message_id)
            .map(|f| f.content.clone())
            .unwrap_or_default();
        let counter = Arc::clone(&self.fetched_chunks);
        let fail_at = self.fail_at_chunk;

        Box::pin(stream::try_unfold(
            (offset as usize, 0usize),
            move |(position, index)| {
                let content = content.clone();
                let counter = Arc::clone(&counter);
                async move {
                    if fail_at == Some(index) {
                        return Err(AppError::Internal("backend unavailable".to_string()));
                    }
                    if position >= content.len() {
                        return Ok(None);
                    }
                    counter.fetch_add(1, Ordering::SeqCst);
                    let end = (position + chunk_size as usize).min(content.len());
                    Ok(Some((content.slice(position..end), (end, index + 1))))
                }
            },
        ))
    }
}
