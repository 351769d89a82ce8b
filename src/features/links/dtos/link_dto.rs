use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::features::links::models::{CallbackMethod, LinkTransaction};
use crate::shared::validation::{ACCESS_CODE_REGEX, DEVICE_ID_REGEX};

/// Device + file pair sent by the client app
///
/// Used by `/api/request` and `/api/links`.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LinkRequestDto {
    /// Installation id of the requesting device
    #[serde(default)]
    #[validate(
        length(min = 1, message = "android_id is required"),
        regex(path = *DEVICE_ID_REGEX, message = "android_id contains invalid characters")
    )]
    #[schema(example = "3f2a9c1b7e5d4a60")]
    pub android_id: String,

    /// Public access code of the file
    #[serde(default)]
    #[validate(
        length(min = 1, message = "hash_id is required"),
        regex(path = *ACCESS_CODE_REGEX, message = "hash_id must be a lowercase hex access code")
    )]
    #[schema(example = "a1b2c3d4e5f60718293a4b5c")]
    pub hash_id: String,
}

/// Postback parameters, accepted as JSON body (POST) or query string (GET)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PostbackDto {
    #[serde(default)]
    #[validate(
        length(min = 1, message = "android_id is required"),
        regex(path = *DEVICE_ID_REGEX, message = "android_id contains invalid characters")
    )]
    pub android_id: String,

    #[serde(default)]
    #[validate(
        length(min = 1, message = "hash_id is required"),
        regex(path = *ACCESS_CODE_REGEX, message = "hash_id must be a lowercase hex access code")
    )]
    pub hash_id: String,

    /// Third-party URL that receives the issued links
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(url(message = "callback_url must be a valid URL"))]
    pub callback_url: Option<String>,

    /// GET sends the links as query parameters, POST as a JSON body
    #[serde(default, deserialize_with = "callback_method_or_none")]
    pub callback_method: Option<CallbackMethod>,
}

/// Blank form values (`callback_url=`) mean the field was not given
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty()))
}

fn callback_method_or_none<'de, D>(deserializer: D) -> Result<Option<CallbackMethod>, D::Error>
where
    D: Deserializer<'de>,
{
    match empty_as_none(deserializer)? {
        None => Ok(None),
        Some(v) => CallbackMethod::parse(&v).map(Some).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "unknown callback_method '{}', expected GET or POST",
                v
            ))
        }),
    }
}

/// Response for `/api/request`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LinkRequestResponseDto {
    /// Always `pending`: links are issued by the postback
    pub status: String,
    pub hash_id: String,
}

/// Issued stream and download links
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LinksResponseDto {
    pub hash_id: String,
    pub stream_link: String,
    pub download_link: String,
    pub expires_at: DateTime<Utc>,
}

/// Response for `/api/postback`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PostbackResponseDto {
    pub hash_id: String,
    pub stream_link: String,
    pub download_link: String,
    pub expires_at: DateTime<Utc>,
    /// Present only when a callback URL was given
    pub callback_delivered: Option<bool>,
    pub callback_status: Option<u16>,
    pub callback_error: Option<String>,
}

/// Admin view of a link issuance
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LinkTransactionResponseDto {
    pub id: i64,
    pub file_id: i64,
    pub message_id: i64,
    pub device_id: String,
    pub stream_link: String,
    pub download_link: String,
    pub callback_url: Option<String>,
    pub callback_method: Option<String>,
    pub callback_status: Option<i32>,
    pub callback_response: Option<String>,
    pub delivered: bool,
    pub created_at: DateTime<Utc>,
}

impl From<LinkTransaction> for LinkTransactionResponseDto {
    fn from(t: LinkTransaction) -> Self {
        Self {
            id: t.id,
            file_id: t.file_id,
            message_id: t.message_id,
            device_id: t.device_id,
            stream_link: t.stream_link,
            download_link: t.download_link,
            callback_url: t.callback_url,
            callback_method: t.callback_method,
            callback_status: t.callback_status,
            callback_response: t.callback_response,
            delivered: t.delivered,
            created_at: t.created_at,
        }
    }
}
