//! Remote file backend
//!
//! The messaging platform stores the files; this module exposes it through the
//! [`ChunkBackend`] capability (resolve, properties, chunked fetch) plus the
//! S3-compatible adapter used in production.

mod backend;
#[cfg(test)]
mod memory_backend;
mod object_store_backend;

pub use backend::{ChunkBackend, ChunkStream, FileDescriptor, FileProperties};
#[cfg(test)]
pub use memory_backend::{patterned_content, MemoryChunkBackend};
pub use object_store_backend::ObjectStoreBackend;
