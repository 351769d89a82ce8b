use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::delivery::handlers;
use crate::features::delivery::services::DeliveryService;

/// Public delivery routes; access is controlled by link tokens
pub fn routes(service: Arc<DeliveryService>) -> Router {
    Router::new()
        .route("/dl/{file_id}", get(handlers::download))
        .route("/stream/{file_id}", get(handlers::stream_page))
        .with_state(service)
}
