//! HTTP server facade for the bookshelf service: envelope types, error
//! taxonomy, router construction, and the serve loop.

use anyhow::Context;
use axum::{routing::get, Router};

use bookshelf_kernel::ModuleRegistry;

pub mod envelope;
pub mod error;
pub mod router;

use router::RouterBuilder;

/// Start the HTTP server with the given module registry
pub async fn start_server(
    registry: &ModuleRegistry,
    settings: &bookshelf_kernel::settings::Settings,
) -> anyhow::Result<()> {
    let app = build_router(registry, settings);

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
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    Ok(())
}

/// Build the main HTTP router with all module routes mounted
pub fn build_router(
    registry: &ModuleRegistry,
    settings: &bookshelf_kernel::settings::Settings,
) -> Router {
    let mut router_builder = RouterBuilder::new().route("/healthz", get(health_check));

    for module in registry.modules() {
        tracing::info!(
            module = module.name(),
            "mounting module routes under /{}",
            module.name()
        );
        router_builder = router_builder.mount_module(module.name(), module.routes());
    }

    router_builder = router_builder.with_openapi(registry);

    // Layers wrap the routes registered above.
    router_builder
        .with_tracing()
        .with_cors()
        .with_request_id()
        .with_timeout(settings.server.request_timeout_ms)
        .build()
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "ok"
}

/// Resolves when SIGINT or SIGTERM arrives, draining in-flight requests.
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if signal::ctrl_c().await.is_err() {
            tracing::warn!("failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(_) => {
                tracing::warn!("failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("received SIGINT, shutting down");
        }
        _ = terminate => {
            tracing::info!("received SIGTERM, shutting down");
        }
    }
}
