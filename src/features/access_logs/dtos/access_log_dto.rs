use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::access_logs::models::AccessLogEntry;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AccessLogResponseDto {
    pub id: i64,
    pub file_id: i64,
    pub ip_address: String,
    pub user_agent: String,
    /// Whether the attempt passed the token checks
    pub success: bool,
    pub accessed_at: DateTime<Utc>,
}

impl From<AccessLogEntry> for AccessLogResponseDto {
    fn from(e: AccessLogEntry) -> Self {
        Self {
            id: e.id,
            file_id: e.file_id,
            ip_address: e.ip_address,
            user_agent: e.user_agent,
            success: e.success,
            accessed_at: e.accessed_at,
        }
    }
}
