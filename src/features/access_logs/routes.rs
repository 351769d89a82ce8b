use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::access_logs::handlers;
use crate::features::access_logs::services::AccessLogger;

/// Create admin routes for access logs, nested under `/api/admin`
pub fn routes(logger: Arc<AccessLogger>) -> Router {
    Router::new()
        .route("/files/{id}/access-logs", get(handlers::list_access_logs))
        .with_state(logger)
}
