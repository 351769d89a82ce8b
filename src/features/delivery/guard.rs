//! Token, expiry and revocation checks run before any byte is fetched.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::core::error::{AppError, Result};
use crate::core::extractor::ClientInfo;
use crate::features::access_logs::AccessLogger;
use crate::features::files::models::{FileRecord, TokenKind};
use crate::features::files::repositories::FileRepository;

/// Check a presented token against a record.
///
/// Order: missing token, mismatch, expiry, revocation.
pub fn check_token(
    file: &FileRecord,
    presented: Option<&str>,
    kind: TokenKind,
    now: DateTime<Utc>,
) -> Result<()> {
    let presented = presented
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Token is required".to_string()))?;

    if file.token(kind) != Some(presented) {
        return Err(AppError::Forbidden("Invalid token".to_string()));
    }
    if file.is_expired(now) {
        return Err(AppError::Forbidden("Link has expired".to_string()));
    }
    if !file.is_active {
        return Err(AppError::Forbidden("File has been revoked".to_string()));
    }

    Ok(())
}

/// Looks up the record for a delivery request and authorizes it
#[derive(Clone)]
pub struct AccessGuard {
    files: Arc<dyn FileRepository>,
    logger: AccessLogger,
}

impl AccessGuard {
    pub fn new(files: Arc<dyn FileRepository>, logger: AccessLogger) -> Self {
        Self { files, logger }
    }

    /// Authorize access to the file registered for `message_id`.
    ///
    /// Every rejection of a known file appends a failed access entry.
    pub async fn authorize(
        &self,
        message_id: i64,
        token: Option<&str>,
        kind: TokenKind,
        client: &ClientInfo,
    ) -> Result<FileRecord> {
        let file = self
            .files
            .find_by_message_id(message_id)
            .await?
            .ok_or_else(|| {
                debug!("Access to unknown message {} rejected", message_id);
                AppError::NotFound("File not found".to_string())
            })?;

        if let Err(e) = check_token(&file, token, kind, Utc::now()) {
            debug!("Access to file {} rejected: {}", file.id, e);
            self.logger.record(file.id, client, false);
            return Err(e);
        }

        Ok(file)
    }
}
