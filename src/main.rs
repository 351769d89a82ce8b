mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::Config;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::access_logs::repositories::PgAccessLogRepository;
use crate::features::access_logs::{routes as access_logs_routes, AccessLogger};
use crate::features::delivery::{routes as delivery_routes, AccessGuard, DeliveryService};
use crate::features::files::repositories::{FileRepository, PgFileRepository};
use crate::features::files::{routes as files_routes, FileService};
use crate::features::links::repositories::PgLinkTransactionRepository;
use crate::features::links::{
    admin_routes as links_admin_routes, routes as links_routes, CallbackClient, LinkBuilder,
    LinkService,
};
use crate::modules::storage::{ChunkBackend, ObjectStoreBackend};
use axum::{middleware::from_fn, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "System info: tokio_worker_threads={}, pid={}",
        worker_threads,
        std::process::id()
    );
    tracing::info!(
        "Configuration loaded (chunk_size={} bytes, base_url={})",
        config.streaming.chunk_size,
        config.app.base_url
    );

    // Create database connection pool
    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    tracing::info!("Running database migrations...");
    database::run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    // Remote chunked backend
    let backend: Arc<dyn ChunkBackend> = Arc::new(
        ObjectStoreBackend::new(config.storage.clone())
            .map_err(|e| anyhow::anyhow!("Failed to initialize storage backend: {}", e))?,
    );

    // Repositories
    let file_repository: Arc<dyn FileRepository> = Arc::new(PgFileRepository::new(pool.clone()));
    let access_logger = AccessLogger::new(Arc::new(PgAccessLogRepository::new(pool.clone())));
    let link_transactions = Arc::new(PgLinkTransactionRepository::new(pool.clone()));

    // Services
    let links = LinkBuilder::new(&config.app.base_url);
    let callback_client = CallbackClient::new(&config.callback)
        .map_err(|e| anyhow::anyhow!("Failed to initialize callback client: {}", e))?;

    let file_service = Arc::new(FileService::new(
        Arc::clone(&file_repository),
        Arc::clone(&backend),
        config.streaming.clone(),
    ));
    let link_service = Arc::new(LinkService::new(
        Arc::clone(&file_repository),
        link_transactions,
        callback_client,
        links.clone(),
        config.streaming.clone(),
    ));
    let delivery_service = Arc::new(DeliveryService::new(
        AccessGuard::new(Arc::clone(&file_repository), access_logger.clone()),
        access_logger.clone(),
        Arc::clone(&backend),
        links,
        config.streaming.chunk_size,
    ));
    tracing::info!("Services initialized");

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    // Build swagger router
    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(
                Arc::new(credentials),
                "Swagger UI",
            )))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    // Admin routes (HTTP basic auth), mounted only when credentials are configured
    let admin_routes = if let Some(credentials) = config.admin.credentials() {
        tracing::info!("Admin routes enabled");
        Router::new().nest(
            "/api/admin",
            Router::new()
                .merge(files_routes(file_service))
                .merge(access_logs_routes(Arc::new(access_logger)))
                .merge(links_admin_routes(Arc::clone(&link_service)))
                .layer(from_fn(middleware::basic_auth_middleware(
                    Arc::new(credentials),
                    "admin",
                ))),
        )
    } else {
        tracing::warn!("Admin routes disabled (ADMIN_USERNAME/ADMIN_PASSWORD not set)");
        Router::new()
    };

    // Simple health check endpoint (no auth required)
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    // Public routes; delivery is guarded by link tokens
    let public_routes = Router::new()
        .merge(delivery_routes(delivery_service))
        .merge(links_routes(link_service));

    let app = Router::new()
        .merge(swagger)
        .merge(admin_routes)
        .merge(public_routes)
        .merge(health_route)
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
    let addr = config.app.server_address();
    let socket_addr: SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    // Large send buffer for media bodies
    socket.set_recv_buffer_size(256 * 1024)?;
    socket.set_send_buffer_size(1024 * 1024)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(65535)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    // Peer address feeds access logs when no X-Forwarded-For is present
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
