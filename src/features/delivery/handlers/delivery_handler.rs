use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap},
    response::{Html, Response},
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::core::error::Result;
use crate::core::extractor::ClientInfo;
use crate::features::delivery::services::DeliveryService;

/// Link token passed in the query string
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TokenQuery {
    pub token: Option<String>,
}

/// Download a file, honoring a single `Range`
#[utoipa::path(
    get,
    path = "/dl/{file_id}",
    params(
        ("file_id" = i64, Path, description = "Message id of the file"),
        TokenQuery,
        ("Range" = Option<String>, Header, description = "Single byte range, e.g. bytes=0-1023")
    ),
    responses(
        (status = 200, description = "Whole file", content_type = "application/octet-stream"),
        (status = 206, description = "Requested byte range", content_type = "application/octet-stream"),
        (status = 401, description = "Token missing"),
        (status = 403, description = "Invalid, expired or revoked token"),
        (status = 404, description = "File not found"),
        (status = 416, description = "Range not satisfiable")
    ),
    tag = "delivery"
)]
pub async fn download(
    State(service): State<Arc<DeliveryService>>,
    Path(file_id): Path<i64>,
    Query(query): Query<TokenQuery>,
    client: ClientInfo,
    headers: HeaderMap,
) -> Result<Response> {
    let range = headers.get(header::RANGE).and_then(|v| v.to_str().ok());

    service
        .download(file_id, query.token.as_deref(), range, &client)
        .await
}

/// HTML player for a file
#[utoipa::path(
    get,
    path = "/stream/{file_id}",
    params(
        ("file_id" = i64, Path, description = "Message id of the file"),
        TokenQuery
    ),
    responses(
        (status = 200, description = "Player page", content_type = "text/html"),
        (status = 401, description = "Token missing"),
        (status = 403, description = "Invalid, expired or revoked token"),
        (status = 404, description = "File not found")
    ),
    tag = "delivery"
)]
pub async fn stream_page(
    State(service): State<Arc<DeliveryService>>,
    Path(file_id): Path<i64>,
    Query(query): Query<TokenQuery>,
    client: ClientInfo,
) -> Result<Html<String>> {
    let page = service
        .player(file_id, query.token.as_deref(), &client)
        .await?;
    Ok(Html(page))
}
