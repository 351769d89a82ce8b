use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::core::error::Result;
use crate::features::access_logs::dtos::AccessLogResponseDto;
use crate::features::access_logs::services::AccessLogger;
use crate::shared::types::{ApiResponse, PaginationQuery};

/// List transfer attempts recorded for a file (paginated)
#[utoipa::path(
    get,
    path = "/api/admin/files/{id}/access-logs",
    params(
        ("id" = i64, Path, description = "File record id"),
        PaginationQuery
    ),
    responses(
        (status = 200, description = "Access log entries, newest first", body = ApiResponse<Vec<AccessLogResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "admin",
    security(
        ("admin_basic" = [])
    )
)]
pub async fn list_access_logs(
    State(logger): State<Arc<AccessLogger>>,
    Path(id): Path<i64>,
    Query(params): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<AccessLogResponseDto>>>> {
    let (entries, meta) = logger.list_for_file(id, &params).await?;
    Ok(Json(ApiResponse::success(Some(entries), None, Some(meta))))
}
