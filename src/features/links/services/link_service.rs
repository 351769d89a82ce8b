use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::core::config::StreamingConfig;
use crate::core::error::{AppError, Result};
use crate::features::files::models::FileRecord;
use crate::features::files::repositories::FileRepository;
use crate::features::links::dtos::{
    LinkRequestDto, LinkRequestResponseDto, LinkTransactionResponseDto, LinksResponseDto,
    PostbackDto, PostbackResponseDto,
};
use crate::features::links::models::NewLinkTransaction;
use crate::features::links::repositories::LinkTransactionRepository;
use crate::features::links::services::{CallbackClient, CallbackOutcome, CallbackPayload};
use crate::shared::constants::TOKEN_BYTES;
use crate::shared::tokens::random_hex;
use crate::shared::types::{Meta, PaginationQuery};

/// Builds public stream and download links
#[derive(Debug, Clone)]
pub struct LinkBuilder {
    base_url: String,
}

impl LinkBuilder {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn stream_link(&self, message_id: i64, token: &str) -> String {
        format!("{}/stream/{}?token={}", self.base_url, message_id, token)
    }

    pub fn download_link(&self, message_id: i64, token: &str) -> String {
        format!("{}/dl/{}?token={}", self.base_url, message_id, token)
    }
}

/// Device binding and link issuance
pub struct LinkService {
    files: Arc<dyn FileRepository>,
    transactions: Arc<dyn LinkTransactionRepository>,
    callback: CallbackClient,
    links: LinkBuilder,
    streaming: StreamingConfig,
}

impl LinkService {
    pub fn new(
        files: Arc<dyn FileRepository>,
        transactions: Arc<dyn LinkTransactionRepository>,
        callback: CallbackClient,
        links: LinkBuilder,
        streaming: StreamingConfig,
    ) -> Self {
        Self {
            files,
            transactions,
            callback,
            links,
            streaming,
        }
    }

    /// Active record for an access code
    async fn active_file(&self, access_code: &str) -> Result<FileRecord> {
        let file = self
            .files
            .find_by_access_code(access_code)
            .await?
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

        if !file.is_active {
            return Err(AppError::Forbidden("File has been revoked".to_string()));
        }
        Ok(file)
    }

    fn ensure_bound_to(file: &FileRecord, device_id: &str) -> Result<()> {
        match file.requested_by_device_id.as_deref() {
            Some(bound) if bound == device_id => Ok(()),
            Some(_) => Err(AppError::Forbidden(
                "Device is not authorized for this file".to_string(),
            )),
            None => Err(AppError::Forbidden(
                "No link was requested for this file".to_string(),
            )),
        }
    }

    /// Expiry for links minted at `now`
    pub fn link_expiry(&self, video_duration: Option<i32>, now: DateTime<Utc>) -> DateTime<Utc> {
        let ttl = match video_duration {
            Some(duration) => i64::from(duration) + self.streaming.duration_grace_secs,
            None => self.streaming.default_link_ttl_secs,
        };
        now + Duration::seconds(ttl)
    }

    /// Bind the device to the file. First device wins; the same device
    /// repeating the request is a no-op.
    pub async fn request_link(&self, dto: LinkRequestDto) -> Result<LinkRequestResponseDto> {
        let file = self.active_file(&dto.hash_id).await?;

        if file.requested_by_device_id.as_deref() != Some(dto.android_id.as_str()) {
            self.files
                .bind_device(file.id, &dto.android_id)
                .await?
                .ok_or_else(|| {
                    debug!("Device binding rejected for file {}", file.id);
                    AppError::Conflict("File was already requested by another device".to_string())
                })?;
            info!("Device bound: file_id={}", file.id);
        }

        Ok(LinkRequestResponseDto {
            status: "pending".to_string(),
            hash_id: dto.hash_id,
        })
    }

    /// Mint fresh tokens for the bound device, overwriting earlier ones, and
    /// optionally relay the links to a callback.
    pub async fn postback(&self, dto: PostbackDto) -> Result<PostbackResponseDto> {
        let file = self.active_file(&dto.hash_id).await?;
        Self::ensure_bound_to(&file, &dto.android_id)?;

        let stream_token = random_hex(TOKEN_BYTES);
        let download_token = random_hex(TOKEN_BYTES);
        let expires_at = self.link_expiry(file.video_duration, Utc::now());

        let file = self
            .files
            .set_tokens(file.id, &stream_token, &download_token, expires_at)
            .await?;

        let stream_link = self.links.stream_link(file.message_id, &stream_token);
        let download_link = self.links.download_link(file.message_id, &download_token);
        info!(
            "Links issued: file_id={}, expires_at={}",
            file.id,
            expires_at.to_rfc3339()
        );

        let method = dto
            .callback_method
            .unwrap_or_else(|| self.callback.default_method());
        let outcome: Option<CallbackOutcome> = match dto.callback_url.as_deref() {
            Some(url) => {
                let payload = CallbackPayload {
                    android_id: dto.android_id.clone(),
                    stream_link: stream_link.clone(),
                    download_link: download_link.clone(),
                };
                Some(self.callback.deliver(url, method, &payload).await)
            }
            None => None,
        };

        let transaction = NewLinkTransaction {
            file_id: file.id,
            message_id: file.message_id,
            device_id: dto.android_id.clone(),
            access_code: file.access_code.clone(),
            stream_link: stream_link.clone(),
            download_link: download_link.clone(),
            callback_url: dto.callback_url.clone(),
            callback_method: dto.callback_url.as_ref().map(|_| method.as_str().to_string()),
            callback_status: outcome
                .as_ref()
                .and_then(|o| o.status)
                .map(i32::from),
            callback_response: outcome.as_ref().and_then(|o| o.response.clone()),
            delivered: outcome.as_ref().is_some_and(|o| o.delivered),
        };
        if let Err(e) = self.transactions.insert(transaction).await {
            warn!("Failed to record link transaction for file {}: {}", file.id, e);
        }

        Ok(PostbackResponseDto {
            hash_id: dto.hash_id,
            stream_link,
            download_link,
            expires_at,
            callback_delivered: outcome.as_ref().map(|o| o.delivered),
            callback_status: outcome.as_ref().and_then(|o| o.status),
            callback_error: outcome.and_then(|o| o.error),
        })
    }

    /// Currently valid links for the bound device
    pub async fn current_links(&self, dto: LinkRequestDto) -> Result<LinksResponseDto> {
        let file = self.active_file(&dto.hash_id).await?;
        Self::ensure_bound_to(&file, &dto.android_id)?;

        let (Some(stream_token), Some(download_token), Some(expires_at)) = (
            file.stream_token.as_deref(),
            file.download_token.as_deref(),
            file.link_expiry,
        ) else {
            return Err(AppError::NotFound(
                "No links have been issued for this file".to_string(),
            ));
        };

        if file.is_expired(Utc::now()) {
            return Err(AppError::Forbidden("Links have expired".to_string()));
        }

        Ok(LinksResponseDto {
            hash_id: dto.hash_id,
            stream_link: self.links.stream_link(file.message_id, stream_token),
            download_link: self.links.download_link(file.message_id, download_token),
            expires_at,
        })
    }

    pub async fn list_transactions(
        &self,
        file_id: i64,
        query: &PaginationQuery,
    ) -> Result<(Vec<LinkTransactionResponseDto>, Meta)> {
        let total = self.transactions.count_for_file(file_id).await?;
        let transactions = self
            .transactions
            .list_for_file(file_id, query.limit(), query.offset())
            .await?;

        Ok((
            transactions.into_iter().map(Into::into).collect(),
            query.meta(total),
        ))
    }
}
