//! Chunk-aligned streaming of a byte interval from the remote backend.
//!
//! The backend only serves fixed-size chunks at aligned offsets, so the
//! interval is widened to the chunk grid, pulled one chunk at a time and
//! trimmed at both ends. At most one chunk is held in memory.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::{ready, Stream};
use tracing::{debug, warn};

use crate::core::error::AppError;
use crate::features::delivery::range::ByteRange;
use crate::modules::storage::{ChunkBackend, ChunkStream, FileDescriptor};

/// How an interval maps onto the chunk grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    pub chunk_size: u64,
    /// Aligned offset of the first chunk to pull
    pub offset: u64,
    /// Bytes dropped from the front of the first chunk
    pub first_cut: u64,
    /// Bytes kept from the front of the last chunk
    pub last_cut: u64,
    pub part_count: u64,
}

impl ChunkPlan {
    pub fn new(range: ByteRange, chunk_size: u64) -> Self {
        let offset = range.start - range.start % chunk_size;
        Self {
            chunk_size,
            offset,
            first_cut: range.start - offset,
            last_cut: range.end % chunk_size + 1,
            // Counted on the grid so an `end` on a chunk boundary still gets its chunk
            part_count: range.end / chunk_size - offset / chunk_size + 1,
        }
    }

    /// Byte window to emit from the `index`-th chunk (1-based) of `len` bytes
    fn window(&self, index: u64, len: usize) -> (usize, usize) {
        let len = len as u64;
        let start = if index == 1 { self.first_cut } else { 0 };
        let end = if index == self.part_count {
            self.last_cut
        } else {
            len
        };
        (start.min(len) as usize, end.min(len) as usize)
    }
}

/// Lazy, forward-only body for one response.
///
/// Each poll pulls at most one chunk. Dropping the stream drops the backend
/// stream with it, so nothing more is fetched once the client is gone.
pub struct RangeStream {
    chunks: ChunkStream,
    plan: ChunkPlan,
    pulled: u64,
    finished: bool,
    message_id: i64,
}

impl RangeStream {
    pub fn new(
        backend: &dyn ChunkBackend,
        descriptor: &FileDescriptor,
        range: ByteRange,
        chunk_size: u64,
    ) -> Self {
        let plan = ChunkPlan::new(range, chunk_size);
        debug!(
            "Streaming message {} bytes {}-{} in {} chunk(s) from offset {}",
            descriptor.message_id, range.start, range.end, plan.part_count, plan.offset
        );

        Self {
            chunks: backend.fetch_chunk_stream(descriptor, plan.offset, chunk_size),
            plan,
            pulled: 0,
            finished: false,
            message_id: descriptor.message_id,
        }
    }

    pub fn plan(&self) -> ChunkPlan {
        self.plan
    }
}

impl Stream for RangeStream {
    type Item = Result<Bytes, AppError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        if this.finished || this.pulled >= this.plan.part_count {
            this.finished = true;
            return Poll::Ready(None);
        }

        let chunk = match ready!(this.chunks.as_mut().poll_next(cx)) {
            Some(Ok(chunk)) => chunk,
            Some(Err(e)) => {
                this.finished = true;
                warn!("Chunk fetch failed for message {}: {}", this.message_id, e);
                return Poll::Ready(Some(Err(e)));
            }
            None => {
                this.finished = true;
                return Poll::Ready(None);
            }
        };

        this.pulled += 1;
        let index = this.pulled;
        let short = (chunk.len() as u64) < this.plan.chunk_size;
        if short || index == this.plan.part_count {
            this.finished = true;
        }

        let (start, end) = this.plan.window(index, chunk.len());
        if start >= end {
            this.finished = true;
            return Poll::Ready(None);
        }

        Poll::Ready(Some(Ok(chunk.slice(start..end))))
    }
}

impl Drop for RangeStream {
    fn drop(&mut self) {
        if !self.finished {
            debug!(
                "Client disconnected from message {} after {} of {} chunk(s)",
                self.message_id, self.pulled, self.plan.part_count
            );
        }
    }
}
