//! `Range` header resolution for single `bytes` ranges.
//!
//! Only `bytes=<start>-<end>` and `bytes=<start>-` are honored. Suffix
//! ranges, multiple ranges and other units are unsatisfiable. An `end` equal
//! to the file size is still accepted and clamped to the last byte; only an
//! `end` strictly past the size is rejected.

use crate::core::error::AppError;

/// An inclusive byte range (`start..=end`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Length in bytes; `end` is inclusive.
    pub fn len(self) -> u64 {
        self.end - self.start + 1
    }
}

/// Validated interval plus whether it came from a `Range` header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRange {
    pub range: ByteRange,
    pub partial: bool,
    pub file_size: u64,
}

impl ResolvedRange {
    /// `Content-Range` value, e.g. `bytes 0-499/1000`
    pub fn content_range(&self) -> String {
        format!(
            "bytes {}-{}/{}",
            self.range.start, self.range.end, self.file_size
        )
    }
}

fn unsatisfiable(message: &str, file_size: u64) -> AppError {
    AppError::RangeNotSatisfiable {
        message: message.to_string(),
        file_size,
    }
}

fn parse_bound(value: &str, file_size: u64) -> Result<u64, AppError> {
    let value = value.trim();
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(unsatisfiable("Invalid range bound", file_size));
    }
    value
        .parse::<u64>()
        .map_err(|_| unsatisfiable("Invalid range bound", file_size))
}

/// Resolve an optional `Range` header against the authoritative file size.
pub fn resolve_range(header: Option<&str>, file_size: u64) -> Result<ResolvedRange, AppError> {
    if file_size == 0 {
        return Err(unsatisfiable("File is empty", file_size));
    }

    let Some(header) = header else {
        return Ok(ResolvedRange {
            range: ByteRange {
                start: 0,
                end: file_size - 1,
            },
            partial: false,
            file_size,
        });
    };

    let (unit, spec) = header
        .trim()
        .split_once('=')
        .ok_or_else(|| unsatisfiable("Malformed Range header", file_size))?;
    if !unit.trim().eq_ignore_ascii_case("bytes") {
        return Err(unsatisfiable("Unsupported range unit", file_size));
    }
    if spec.contains(',') {
        return Err(unsatisfiable("Multiple ranges are not supported", file_size));
    }

    let (start, end) = spec
        .split_once('-')
        .ok_or_else(|| unsatisfiable("Malformed Range header", file_size))?;
    if start.trim().is_empty() {
        return Err(unsatisfiable("Suffix ranges are not supported", file_size));
    }

    let start = parse_bound(start, file_size)?;
    let end = if end.trim().is_empty() {
        file_size - 1
    } else {
        parse_bound(end, file_size)?
    };

    if end > file_size {
        return Err(unsatisfiable("Range end exceeds file size", file_size));
    }
    if end < start {
        return Err(unsatisfiable("Range end precedes start", file_size));
    }

    let end = end.min(file_size - 1);
    if start > end {
        return Err(unsatisfiable("Range starts past the end of file", file_size));
    }

    Ok(ResolvedRange {
        range: ByteRange { start, end },
        partial: true,
        file_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(header: Option<&str>, size: u64) -> ResolvedRange {
        resolve_range(header, size).unwrap()
    }

    fn is_unsatisfiable(header: Option<&str>, size: u64) -> bool {
        matches!(
            resolve_range(header, size),
            Err(AppError::RangeNotSatisfiable { file_size, .. }) if file_size == size
        )
    }

    #[test]
    fn test_absent_header_is_full_file() {
        let r = resolved(None, 1000);
        assert_eq!(r.range, ByteRange { start: 0, end: 999 });
        assert!(!r.partial);
        assert_eq!(r.content_range(), "bytes 0-999/1000");
        assert_eq!(r.range.len(), 1000);
    }

    #[test]
    fn test_open_ended_range() {
        let r = resolved(Some("bytes=0-"), 500_000);
        assert_eq!(r.range, ByteRange { start: 0, end: 499_999 });
        assert!(r.partial);
        assert_eq!(r.content_range(), "bytes 0-499999/500000");
    }

    #[test]
    fn test_explicit_range() {
        let r = resolved(Some("bytes=100-199"), 1000);
        assert_eq!(r.range, ByteRange { start: 100, end: 199 });
        assert_eq!(r.range.len(), 100);
    }

    #[test]
    fn test_end_equal_to_size_is_clamped() {
        let r = resolved(Some("bytes=0-1000"), 1000);
        assert_eq!(r.range, ByteRange { start: 0, end: 999 });
    }

    #[test]
    fn test_end_past_size_is_rejected() {
        assert!(is_unsatisfiable(Some("bytes=0-2000"), 1000));
        assert!(is_unsatisfiable(Some("bytes=0-1001"), 1000));
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        assert!(is_unsatisfiable(Some("bytes=10-5"), 1000));
    }

    #[test]
    fn test_interval_empty_after_clamp_is_rejected() {
        assert!(is_unsatisfiable(Some("bytes=1000-1000"), 1000));
        assert!(is_unsatisfiable(Some("bytes=1000-"), 1000));
    }

    #[test]
    fn test_malformed_headers_are_rejected() {
        assert!(is_unsatisfiable(Some("bytes=-500"), 1000));
        assert!(is_unsatisfiable(Some("bytes=0-1,5-6"), 1000));
        assert!(is_unsatisfiable(Some("items=0-1"), 1000));
        assert!(is_unsatisfiable(Some("bytes=a-b"), 1000));
        assert!(is_unsatisfiable(Some("bytes=+1-5"), 1000));
        assert!(is_unsatisfiable(Some("bytes 0-1"), 1000));
    }

    #[test]
    fn test_empty_file_cannot_be_served() {
        assert!(is_unsatisfiable(None, 0));
        assert!(is_unsatisfiable(Some("bytes=0-"), 0));
    }

    #[test]
    fn test_unit_is_case_insensitive() {
        let r = resolved(Some("Bytes=5-9"), 10);
        assert_eq!(r.range, ByteRange { start: 5, end: 9 });
    }
}
