use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::files::dtos::{DeleteFileResponseDto, FileResponseDto, RegisterFileDto};
use crate::features::files::services::FileService;
use crate::shared::types::{ApiResponse, PaginationQuery};

/// Register a channel message as a served file
#[utoipa::path(
    post,
    path = "/api/admin/files",
    request_body = RegisterFileDto,
    responses(
        (status = 201, description = "File registered", body = ApiResponse<FileResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Message not found in channel"),
        (status = 409, description = "Message already registered")
    ),
    tag = "admin",
    security(
        ("admin_basic" = [])
    )
)]
pub async fn register_file(
    State(service): State<Arc<FileService>>,
    AppJson(dto): AppJson<RegisterFileDto>,
) -> Result<(StatusCode, Json<ApiResponse<FileResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let file = service.register(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(file),
            Some("File registered successfully".to_string()),
            None,
        )),
    ))
}

/// List registered files (paginated)
#[utoipa::path(
    get,
    path = "/api/admin/files",
    params(PaginationQuery),
    responses(
        (status = 200, description = "List of files", body = ApiResponse<Vec<FileResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "admin",
    security(
        ("admin_basic" = [])
    )
)]
pub async fn list_files(
    State(service): State<Arc<FileService>>,
    Query(params): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<FileResponseDto>>>> {
    let (files, meta) = service.list(&params).await?;
    Ok(Json(ApiResponse::success(Some(files), None, Some(meta))))
}

/// Get a registered file by id
#[utoipa::path(
    get,
    path = "/api/admin/files/{id}",
    params(
        ("id" = i64, Path, description = "File record id")
    ),
    responses(
        (status = 200, description = "File found", body = ApiResponse<FileResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "File not found")
    ),
    tag = "admin",
    security(
        ("admin_basic" = [])
    )
)]
pub async fn get_file(
    State(service): State<Arc<FileService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<FileResponseDto>>> {
    let file = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(file), None, None)))
}

/// Revoke every link of a file
#[utoipa::path(
    post,
    path = "/api/admin/files/{id}/revoke",
    params(
        ("id" = i64, Path, description = "File record id")
    ),
    responses(
        (status = 200, description = "File revoked", body = ApiResponse<FileResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "File not found")
    ),
    tag = "admin",
    security(
        ("admin_basic" = [])
    )
)]
pub async fn revoke_file(
    State(service): State<Arc<FileService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<FileResponseDto>>> {
    let file = service.revoke(id).await?;
    Ok(Json(ApiResponse::success(
        Some(file),
        Some("File revoked".to_string()),
        None,
    )))
}

/// Delete a file record (the remote object is kept)
#[utoipa::path(
    delete,
    path = "/api/admin/files/{id}",
    params(
        ("id" = i64, Path, description = "File record id")
    ),
    responses(
        (status = 200, description = "File record deleted", body = ApiResponse<DeleteFileResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "File not found")
    ),
    tag = "admin",
    security(
        ("admin_basic" = [])
    )
)]
pub async fn delete_file(
    State(service): State<Arc<FileService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<DeleteFileResponseDto>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        Some(DeleteFileResponseDto { deleted: true }),
        Some("File record deleted".to_string()),
        None,
    )))
}
