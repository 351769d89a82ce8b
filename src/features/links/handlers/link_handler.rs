use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::links::dtos::{
    LinkRequestDto, LinkRequestResponseDto, LinkTransactionResponseDto, LinksResponseDto,
    PostbackDto, PostbackResponseDto,
};
use crate::features::links::services::LinkService;
use crate::shared::types::{ApiResponse, PaginationQuery};

/// Request a link for a file, binding the calling device
#[utoipa::path(
    post,
    path = "/api/request",
    request_body = LinkRequestDto,
    responses(
        (status = 202, description = "Device bound, links pending", body = ApiResponse<LinkRequestResponseDto>),
        (status = 400, description = "Missing or invalid fields"),
        (status = 403, description = "File revoked"),
        (status = 404, description = "Unknown access code"),
        (status = 409, description = "File already requested by another device")
    ),
    tag = "links"
)]
pub async fn request_link(
    State(service): State<Arc<LinkService>>,
    AppJson(dto): AppJson<LinkRequestDto>,
) -> Result<(StatusCode, Json<ApiResponse<LinkRequestResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let response = service.request_link(dto).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse::success(Some(response), None, None)),
    ))
}

/// Issue stream and download links (JSON body)
#[utoipa::path(
    post,
    path = "/api/postback",
    request_body = PostbackDto,
    responses(
        (status = 200, description = "Links issued", body = ApiResponse<PostbackResponseDto>),
        (status = 400, description = "Missing or invalid fields"),
        (status = 403, description = "File revoked or device not bound"),
        (status = 404, description = "Unknown access code")
    ),
    tag = "links"
)]
pub async fn postback(
    State(service): State<Arc<LinkService>>,
    AppJson(dto): AppJson<PostbackDto>,
) -> Result<Json<ApiResponse<PostbackResponseDto>>> {
    issue_links(&service, dto).await
}

/// Issue stream and download links (query string)
#[utoipa::path(
    get,
    path = "/api/postback",
    params(PostbackDto),
    responses(
        (status = 200, description = "Links issued", body = ApiResponse<PostbackResponseDto>),
        (status = 400, description = "Missing or invalid fields"),
        (status = 403, description = "File revoked or device not bound"),
        (status = 404, description = "Unknown access code")
    ),
    tag = "links"
)]
pub async fn postback_query(
    State(service): State<Arc<LinkService>>,
    Query(dto): Query<PostbackDto>,
) -> Result<Json<ApiResponse<PostbackResponseDto>>> {
    issue_links(&service, dto).await
}

async fn issue_links(
    service: &LinkService,
    dto: PostbackDto,
) -> Result<Json<ApiResponse<PostbackResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let response = service.postback(dto).await?;
    let message = match response.callback_delivered {
        Some(true) => "Links issued and delivered to callback",
        Some(false) => "Links issued, callback delivery failed",
        None => "Links issued",
    };
    Ok(Json(ApiResponse::success(
        Some(response),
        Some(message.to_string()),
        None,
    )))
}

/// Fetch the currently valid links
#[utoipa::path(
    post,
    path = "/api/links",
    request_body = LinkRequestDto,
    responses(
        (status = 200, description = "Current links", body = ApiResponse<LinksResponseDto>),
        (status = 400, description = "Missing or invalid fields"),
        (status = 403, description = "Revoked, expired or device not bound"),
        (status = 404, description = "Unknown access code or no links issued yet")
    ),
    tag = "links"
)]
pub async fn current_links(
    State(service): State<Arc<LinkService>>,
    AppJson(dto): AppJson<LinkRequestDto>,
) -> Result<Json<ApiResponse<LinksResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let links = service.current_links(dto).await?;
    Ok(Json(ApiResponse::success(Some(links), None, None)))
}

/// List link issuances for a file (paginated)
#[utoipa::path(
    get,
    path = "/api/admin/files/{id}/link-transactions",
    params(
        ("id" = i64, Path, description = "File record id"),
        PaginationQuery
    ),
    responses(
        (status = 200, description = "Link transactions, newest first", body = ApiResponse<Vec<LinkTransactionResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "admin",
    security(
        ("admin_basic" = [])
    )
)]
pub async fn list_link_transactions(
    State(service): State<Arc<LinkService>>,
    Path(id): Path<i64>,
    Query(params): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<LinkTransactionResponseDto>>>> {
    let (transactions, meta) = service.list_transactions(id, &params).await?;
    Ok(Json(ApiResponse::success(
        Some(transactions),
        None,
        Some(meta),
    )))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    use crate::shared::test_helpers::{settle, TestContext};

    async fn setup() -> (TestServer, TestContext, String) {
        let ctx = TestContext::new();
        let file = ctx.seed_file(7, vec![0u8; 4096]).await;
        let server = TestServer::new(ctx.router().into_make_service()).expect("test server");
        (server, ctx, file.access_code)
    }

    /// Splits an issued link into its path and token
    fn path_and_token(link: &str) -> (String, String) {
        let (path, token) = link
            .trim_start_matches("http://localhost:5000")
            .split_once("?token=")
            .unwrap();
        (path.to_string(), token.to_string())
    }

    async fn issue(server: &TestServer, code: &str) -> (String, String) {
        let response = server
            .post("/api/postback")
            .json(&json!({ "android_id": "device-a", "hash_id": code }))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        (
            body["data"]["stream_link"].as_str().unwrap().to_string(),
            body["data"]["download_link"].as_str().unwrap().to_string(),
        )
    }

    #[tokio::test]
    async fn test_request_returns_pending() {
        let (server, _ctx, code) = setup().await;

        let response = server
            .post("/api/request")
            .json(&json!({ "android_id": "device-a", "hash_id": code }))
            .await;

        assert_eq!(response.status_code(), StatusCode::ACCEPTED);
        let body: Value = response.json();
        assert_eq!(body["data"]["status"], "pending");
    }

    #[tokio::test]
    async fn test_request_missing_fields_is_bad_request() {
        let (server, _ctx, _) = setup().await;

        let response = server.post("/api/request").json(&json!({})).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_second_device_conflicts() {
        let (server, _ctx, code) = setup().await;

        server
            .post("/api/request")
            .json(&json!({ "android_id": "device-a", "hash_id": code }))
            .await;
        let again = server
            .post("/api/request")
            .json(&json!({ "android_id": "device-a", "hash_id": code }))
            .await;
        assert_eq!(again.status_code(), StatusCode::ACCEPTED);

        let other = server
            .post("/api/request")
            .json(&json!({ "android_id": "device-b", "hash_id": code }))
            .await;
        assert_eq!(other.status_code(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_full_flow_request_postback_download() {
        let (server, ctx, code) = setup().await;

        server
            .post("/api/request")
            .json(&json!({ "android_id": "device-a", "hash_id": code }))
            .await;

        let postback = server
            .get("/api/postback")
            .add_query_param("android_id", "device-a")
            .add_query_param("hash_id", &code)
            .await;
        postback.assert_status_ok();
        let body: Value = postback.json();
        let download_link = body["data"]["download_link"].as_str().unwrap().to_string();

        let links: Value = server
            .post("/api/links")
            .json(&json!({ "android_id": "device-a", "hash_id": code }))
            .await
            .json();
        assert_eq!(links["data"]["download_link"], download_link.as_str());

        let path = download_link.trim_start_matches("http://localhost:5000");
        let (path, query) = path.split_once("?token=").unwrap();
        let download = server
            .get(path)
            .add_query_param("token", query)
            .add_header("Range", "bytes=0-99")
            .await;
        assert_eq!(download.status_code(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(download.as_bytes().len(), 100);

        settle().await;
        assert_eq!(ctx.transactions.all().len(), 1);
    }

    #[tokio::test]
    async fn test_postback_query_with_blank_callback_fields() {
        let (server, _ctx, code) = setup().await;

        server
            .post("/api/request")
            .json(&json!({ "android_id": "device-a", "hash_id": code }))
            .await;

        let response = server
            .get("/api/postback")
            .add_query_param("android_id", "device-a")
            .add_query_param("hash_id", &code)
            .add_query_param("callback_url", "")
            .add_query_param("callback_method", "")
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert!(body["data"]["callback_delivered"].is_null());
        assert_eq!(body["message"], "Links issued");
    }

    #[tokio::test]
    async fn test_postback_unknown_callback_method_is_bad_request() {
        let (server, _ctx, code) = setup().await;

        let response = server
            .get("/api/postback")
            .add_query_param("android_id", "device-a")
            .add_query_param("hash_id", &code)
            .add_query_param("callback_method", "PUT")
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_second_postback_invalidates_previous_links() {
        let (server, _ctx, code) = setup().await;

        server
            .post("/api/request")
            .json(&json!({ "android_id": "device-a", "hash_id": code }))
            .await;

        let (old_stream, old_download) = issue(&server, &code).await;
        let (new_stream, new_download) = issue(&server, &code).await;
        assert_ne!(old_download, new_download);

        let (path, token) = path_and_token(&old_download);
        let response = server.get(&path).add_query_param("token", &token).await;
        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

        let (path, token) = path_and_token(&old_stream);
        let response = server.get(&path).add_query_param("token", &token).await;
        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

        let (path, token) = path_and_token(&new_download);
        server
            .get(&path)
            .add_query_param("token", &token)
            .await
            .assert_status_ok();
        let ranged = server
            .get(&path)
            .add_query_param("token", &token)
            .add_header("Range", "bytes=0-9")
            .await;
        assert_eq!(ranged.status_code(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(ranged.as_bytes().len(), 10);

        let (path, token) = path_and_token(&new_stream);
        server
            .get(&path)
            .add_query_param("token", &token)
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn test_postback_json_for_unbound_device_is_forbidden() {
        let (server, _ctx, code) = setup().await;

        let response = server
            .post("/api/postback")
            .json(&json!({ "android_id": "device-a", "hash_id": code }))
            .await;
        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_links_before_postback_is_not_found() {
        let (server, _ctx, code) = setup().await;

        server
            .post("/api/request")
            .json(&json!({ "android_id": "device-a", "hash_id": code }))
            .await;
        let response = server
            .post("/api/links")
            .json(&json!({ "android_id": "device-a", "hash_id": code }))
            .await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_admin_lists_link_transactions() {
        let (server, ctx, code) = setup().await;
        server
            .post("/api/request")
            .json(&json!({ "android_id": "device-a", "hash_id": code }))
            .await;
        server
            .post("/api/postback")
            .json(&json!({ "android_id": "device-a", "hash_id": code }))
            .await
            .assert_status_ok();

        let file = ctx.files.get(1).unwrap();
        let response = server
            .get(&format!("/api/admin/files/{}/link-transactions", file.id))
            .add_header("Authorization", "Basic YWRtaW46c2VjcmV0")
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["meta"]["total"], 1);
        assert_eq!(body["data"][0]["device_id"], "device-a");
    }
}
