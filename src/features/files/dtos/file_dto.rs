use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::files::models::{FileRecord, LinkState};

/// Request DTO for registering a channel message as a served file
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterFileDto {
    /// Message id of the file in the storage channel
    #[validate(range(min = 1, message = "message_id must be positive"))]
    pub message_id: i64,
    /// Video duration in seconds; read from the backend when omitted
    #[validate(range(min = 0, message = "video_duration must not be negative"))]
    pub video_duration: Option<i32>,
}

/// Admin view of an access record
///
/// Tokens are never echoed back; only whether a link is currently issued.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FileResponseDto {
    pub id: i64,
    pub message_id: i64,
    pub filename: String,
    pub file_size: i64,
    pub mime_type: String,
    /// Public identifier handed to clients as `hash_id`
    pub access_code: String,
    pub video_duration: Option<i32>,
    pub requested_by_device_id: Option<String>,
    pub link_expiry: Option<DateTime<Utc>>,
    pub link_state: LinkState,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FileResponseDto {
    pub fn from_record(record: FileRecord, now: DateTime<Utc>) -> Self {
        let link_state = record.link_state(now);
        Self {
            id: record.id,
            message_id: record.message_id,
            filename: record.filename,
            file_size: record.file_size,
            mime_type: record.mime_type,
            access_code: record.access_code,
            video_duration: record.video_duration,
            requested_by_device_id: record.requested_by_device_id,
            link_expiry: record.link_expiry,
            link_state,
            is_active: record.is_active,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Response DTO for delete operations
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteFileResponseDto {
    pub deleted: bool,
}
