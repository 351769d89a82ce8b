use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Access record for one remote file
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct FileRecord {
    pub id: i64,
    /// Message id of the file in the storage channel (public file id in links)
    pub message_id: i64,
    pub filename: String,
    pub file_size: i64,
    pub mime_type: String,
    /// Public, stable identifier handed to clients (hash id)
    pub access_code: String,
    pub video_duration: Option<i32>,
    /// One-shot device binding
    pub requested_by_device_id: Option<String>,
    pub stream_token: Option<String>,
    pub download_token: Option<String>,
    pub link_expiry: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to create a record at registration time
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    pub message_id: i64,
    pub filename: String,
    pub file_size: i64,
    pub mime_type: String,
    pub access_code: String,
    pub video_duration: Option<i32>,
}

/// Token namespaces; a token of one kind never opens the other endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Stream,
    Download,
}

/// Link issuance state derived from a record at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LinkState {
    Uploaded,
    Requested,
    Linked,
    Expired,
    Revoked,
}

impl FileRecord {
    pub fn token(&self, kind: TokenKind) -> Option<&str> {
        match kind {
            TokenKind::Stream => self.stream_token.as_deref(),
            TokenKind::Download => self.download_token.as_deref(),
        }
    }

    /// Expiry is computed, never stored: `now >= link_expiry`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.link_expiry {
            Some(expiry) => now >= expiry,
            None => true,
        }
    }

    pub fn has_tokens(&self) -> bool {
        self.stream_token.is_some() && self.download_token.is_some() && self.link_expiry.is_some()
    }

    pub fn link_state(&self, now: DateTime<Utc>) -> LinkState {
        if !self.is_active {
            LinkState::Revoked
        } else if self.has_tokens() {
            if self.is_expired(now) {
                LinkState::Expired
            } else {
                LinkState::Linked
            }
        } else if self.requested_by_device_id.is_some() {
            LinkState::Requested
        } else {
            LinkState::Uploaded
        }
    }
}
