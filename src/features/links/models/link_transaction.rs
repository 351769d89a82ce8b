use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// HTTP method used to relay issued links to a third-party callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum CallbackMethod {
    #[serde(alias = "get")]
    Get,
    #[serde(alias = "post")]
    Post,
}

impl CallbackMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallbackMethod::Get => "GET",
            CallbackMethod::Post => "POST",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "GET" => Some(CallbackMethod::Get),
            "POST" => Some(CallbackMethod::Post),
            _ => None,
        }
    }
}

/// One link issuance (postback), kept as an audit trail
#[derive(Debug, Clone, FromRow)]
pub struct LinkTransaction {
    pub id: i64,
    pub file_id: i64,
    pub message_id: i64,
    pub device_id: String,
    pub access_code: String,
    pub stream_link: String,
    pub download_link: String,
    pub callback_url: Option<String>,
    pub callback_method: Option<String>,
    pub callback_status: Option<i32>,
    pub callback_response: Option<String>,
    pub delivered: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewLinkTransaction {
    pub file_id: i64,
    pub message_id: i64,
    pub device_id: String,
    pub access_code: String,
    pub stream_link: String,
    pub download_link: String,
    pub callback_url: Option<String>,
    pub callback_method: Option<String>,
    pub callback_status: Option<i32>,
    pub callback_response: Option<String>,
    pub delivered: bool,
}
