//! HTTP server bootstrap

use crate::config::ServerConfig;
use crate::routes::router;
use crate::state::AppState;
use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// The full application: routes plus tracing and CORS layers
pub fn app(state: AppState) -> Router {
    router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind `addr` and serve in a background task.
///
/// Returns the bound address (useful with port 0) and the task handle;
/// abort the handle to stop the server.
pub async fn start_server(
    state: AppState,
    addr: &str,
) -> std::io::Result<(SocketAddr, tokio::task::JoinHandle<()>)> {
    let listener = TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!("taskboard listening on http://{}", local_addr);

    let server_task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app(state)).await {
            tracing::error!("taskboard HTTP server error: {}", e);
        }
        tracing::info!("taskboard HTTP server task exiting");
    });

    Ok((local_addr, server_task))
}

/// Serve until Ctrl-C
pub async fn serve(state: AppState, config: &ServerConfig) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.bind_address()).await?;
    tracing::info!("taskboard listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("taskboard stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
