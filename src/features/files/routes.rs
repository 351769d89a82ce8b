use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::files::handlers;
use crate::features::files::services::FileService;

/// Create admin routes for file records, nested under `/api/admin`
pub fn routes(service: Arc<FileService>) -> Router {
    Router::new()
        .route(
            "/files",
            get(handlers::list_files).post(handlers::register_file),
        )
        .route(
            "/files/{id}",
            get(handlers::get_file).delete(handlers::delete_file),
        )
        .route("/files/{id}/revoke", post(handlers::revoke_file))
        .with_state(service)
}
