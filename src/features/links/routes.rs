use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::links::handlers;
use crate::features::links::services::LinkService;

/// Public link issuance routes used by the client app
pub fn routes(service: Arc<LinkService>) -> Router {
    Router::new()
        .route("/api/request", post(handlers::request_link))
        .route(
            "/api/postback",
            get(handlers::postback_query).post(handlers::postback),
        )
        .route("/api/links", post(handlers::current_links))
        .with_state(service)
}

/// Admin routes, nested under `/api/admin`
pub fn admin_routes(service: Arc<LinkService>) -> Router {
    Router::new()
        .route(
            "/files/{id}/link-transactions",
            get(handlers::list_link_transactions),
        )
        .with_state(service)
}
