mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::Config;
use crate::core::{middleware, openapi};
use crate::features::{documents, files};
use crate::modules::document_store::DocumentStoreClient;
use crate::modules::storage::{self, ObjectStorage};
use axum::{http::StatusCode, middleware::from_fn, routing::get, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

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

    let object_storage: Option<Arc<dyn ObjectStorage>> = match &config.object_storage {
        Some(storage_config) => Some(storage::connect(storage_config)),
        None => {
            tracing::warn!(
                "Object storage not configured (IBM_COS_ENDPOINT, IBM_COS_ACCESS_KEY, \
                IBM_COS_SECRET_KEY, IBM_COS_BUCKET); /upload-file will answer 500"
            );
            None
        }
    };

    let document_store = match &config.document_store {
        Some(store_config) => {
            tracing::info!(
                "Document store client initialized for database: {}",
                store_config.database
            );
            Some(Arc::new(DocumentStoreClient::new(store_config)))
        }
        None => {
            tracing::warn!(
                "Document store not configured (CLOUDANT_URL, CLOUDANT_DB); \
                /save-json will answer 500"
            );
            None
        }
    };

    let app = build_app(&config, object_storage, document_store);

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    socket.set_nodelay(true)?;

    let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
    socket.set_tcp_keepalive(&keepalive)?;

    socket.set_nonblocking(true)?;
    socket
        .bind(&socket_addr.into())
        .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", addr, e))?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Assemble the router with all middleware layers
fn build_app(
    config: &Config,
    object_storage: Option<Arc<dyn ObjectStorage>>,
    document_store: Option<Arc<DocumentStoreClient>>,
) -> Router {
    // Simple health check endpoint
    async fn health_check() -> StatusCode {
        StatusCode::OK
    }

    Router::new()
        .merge(files::routes(object_storage))
        .merge(documents::routes(
            document_store,
            config.app.max_request_body_size,
        ))
        .route("/health", get(health_check))
        .route("/api-docs/openapi.json", get(openapi::openapi_json))
        .layer(from_fn(middleware::request_logging))
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid))
}
