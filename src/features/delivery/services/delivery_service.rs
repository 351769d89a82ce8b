use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::Response,
};
use minijinja::context;
use tracing::{error, info};

use crate::core::error::{AppError, Result};
use crate::core::extractor::ClientInfo;
use crate::features::access_logs::AccessLogger;
use crate::features::delivery::engine::RangeStream;
use crate::features::delivery::guard::AccessGuard;
use crate::features::delivery::range::resolve_range;
use crate::features::files::models::TokenKind;
use crate::features::links::LinkBuilder;
use crate::modules::storage::ChunkBackend;
use crate::shared::templates::{render_template, PLAYER_TEMPLATE};

/// Serves guarded byte ranges and the player page
pub struct DeliveryService {
    guard: AccessGuard,
    logger: AccessLogger,
    backend: Arc<dyn ChunkBackend>,
    links: LinkBuilder,
    chunk_size: u64,
}

/// `attachment` disposition with an ASCII fallback and an RFC 5987 name
pub fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    )
}

impl DeliveryService {
    pub fn new(
        guard: AccessGuard,
        logger: AccessLogger,
        backend: Arc<dyn ChunkBackend>,
        links: LinkBuilder,
        chunk_size: u64,
    ) -> Self {
        Self {
            guard,
            logger,
            backend,
            links,
            chunk_size,
        }
    }

    /// Build the response for `GET /dl/{file_id}`.
    ///
    /// The file size is re-read from the backend on every request.
    pub async fn download(
        &self,
        message_id: i64,
        token: Option<&str>,
        range_header: Option<&str>,
        client: &ClientInfo,
    ) -> Result<Response> {
        let file = self
            .guard
            .authorize(message_id, token, TokenKind::Download, client)
            .await?;

        let result = async {
            let descriptor = self
                .backend
                .resolve_file_descriptor(message_id)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound("File is no longer available in the channel".to_string())
                })?;
            let properties = self.backend.get_file_properties(&descriptor).await?;
            let resolved = resolve_range(range_header, properties.size)?;
            Ok::<_, AppError>((descriptor, properties, resolved))
        }
        .await;

        let (descriptor, properties, resolved) = match result {
            Ok(parts) => parts,
            Err(e) => {
                if matches!(e, AppError::Internal(_)) {
                    error!("Failed to prepare download for file {}: {}", file.id, e);
                }
                self.logger.record(file.id, client, false);
                return Err(e);
            }
        };

        self.logger.record(file.id, client, true);
        info!(
            "Serving file {} ({}, {} bytes)",
            file.id,
            resolved.content_range(),
            resolved.range.len()
        );

        let stream = RangeStream::new(
            self.backend.as_ref(),
            &descriptor,
            resolved.range,
            self.chunk_size,
        );
        let status = if resolved.partial {
            StatusCode::PARTIAL_CONTENT
        } else {
            StatusCode::OK
        };
        let content_type = HeaderValue::from_str(&properties.mime_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
        let disposition = HeaderValue::from_str(&content_disposition(&properties.filename))
            .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

        Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, content_type)
            .header(header::CONTENT_RANGE, resolved.content_range())
            .header(header::CONTENT_LENGTH, resolved.range.len())
            .header(header::ACCEPT_RANGES, "bytes")
            .header(header::CONTENT_DISPOSITION, disposition)
            .body(Body::from_stream(stream))
            .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))
    }

    /// Render the player page for `GET /stream/{file_id}`
    pub async fn player(
        &self,
        message_id: i64,
        token: Option<&str>,
        client: &ClientInfo,
    ) -> Result<String> {
        let file = self
            .guard
            .authorize(message_id, token, TokenKind::Stream, client)
            .await?;

        let download_token = file
            .download_token
            .as_deref()
            .ok_or_else(|| AppError::Internal("Linked file has no download token".to_string()))?;
        let media_link = self.links.download_link(file.message_id, download_token);

        render_template(
            PLAYER_TEMPLATE,
            context! {
                filename => file.filename,
                mime_type => file.mime_type,
                media_link => minijinja::Value::from_safe_string(media_link),
            },
        )
        .map_err(|e| AppError::Internal(format!("Failed to render player: {}", e)))
    }
}
