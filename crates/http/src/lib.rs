//! HTTP server facade for SHELF with Axum, error handling, and OpenAPI support.

use anyhow::Context;
use axum::{routing::get, Router};

use shelf_db::Db;
use shelf_kernel::ModuleRegistry;

pub mod error;
pub mod router;

use router::RouterBuilder;

/// Start the HTTP server with the given module registry
pub async fn start_server(
    registry: &ModuleRegistry,
    settings: &shelf_kernel::settings::Settings,
    db: Db,
) -> anyhow::Result<()> {
    tracing::info!(
        "starting HTTP server on {}:{}",
        settings.server.host,
        settings.server.port
    );

    let app = build_router(registry, settings, db);

    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", settings.server.host, settings.server.port))
            .await
            .context("failed to bind to address")?;

    tracing::info!(
        "HTTP server listening on http://{}:{}",
        settings.server.host,
        settings.server.port
    );

    axum::serve(listener, app)
        .await
        .context("HTTP server failed")?;

    Ok(())
}

/// Build the main HTTP router with all module routes merged in
pub fn build_router(
    registry: &ModuleRegistry,
    settings: &shelf_kernel::settings::Settings,
    db: Db,
) -> Router {
    let mut router_builder = RouterBuilder::new();

    // Service status and health check routes
    router_builder = router_builder
        .route("/", get(service_status))
        .route("/healthz", get(health_check));

    // Merge module routes
    for module in registry.modules() {
        tracing::info!(module = module.name(), "merging module routes");
        router_builder = router_builder.merge_module(module.routes(db.clone()));
    }

    // Add OpenAPI documentation
    router_builder = router_builder.with_openapi(registry);

    // Add global middlewares last: `Router::layer` only wraps routes that
    // are already registered.
    router_builder = router_builder
        .with_tracing()
        .with_cors()
        .with_request_id()
        .with_timeout(settings.server.request_timeout_ms);

    router_builder.build()
}

/// Root status endpoint
async fn service_status() -> &'static str {
    "Book API running successfully"
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "ok"
}
