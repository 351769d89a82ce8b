/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// DELIVERY CONSTANTS
// =============================================================================

/// Chunk size pulled from the remote backend (1 MiB)
pub const DEFAULT_CHUNK_SIZE: u64 = 1024 * 1024;

/// Random bytes behind a generated access code
pub const DEFAULT_ACCESS_CODE_BYTES: usize = 12;

/// Random bytes behind each stream/download token
pub const TOKEN_BYTES: usize = 32;

/// Link lifetime when the video duration is unknown (2 hours)
pub const DEFAULT_LINK_TTL_SECS: i64 = 7200;

/// Extra lifetime added on top of a known video duration (1 hour)
pub const DEFAULT_LINK_DURATION_GRACE_SECS: i64 = 3600;
