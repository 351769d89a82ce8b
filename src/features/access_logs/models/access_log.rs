use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// One persisted transfer attempt; append-only
#[derive(Debug, Clone, FromRow)]
pub struct AccessLogEntry {
    pub id: i64,
    pub file_id: i64,
    pub ip_address: String,
    pub user_agent: String,
    pub success: bool,
    pub accessed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccessLogEntry {
    pub file_id: i64,
    pub ip_address: String,
    pub user_agent: String,
    pub success: bool,
}
