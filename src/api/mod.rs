//! HTTP front door: streamable HTTP and legacy SSE transports.

mod handlers;
pub mod routes;
pub mod session;
pub mod sse;
mod state;
pub mod streamable;

#[cfg(test)]
mod session_test;

pub use session::{SessionGuard, SessionStore};
pub use state::AppState;
pub use streamable::StreamableSessions;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use miette::Diagnostic;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, ConfigError};
use crate::mcp::McpServer;
use crate::trello::TrelloApi;

#[derive(Error, Diagnostic, Debug)]
pub enum ApiError {
    #[error("Failed to bind {addr}: {source}")]
    #[diagnostic(code(trello_mcp::api::bind))]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("Server error: {0}")]
    #[diagnostic(code(trello_mcp::api::serve))]
    Serve(#[source] io::Error),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

/// Initialize tracing subscriber with env filter
pub fn init_tracing() {
    // A second call (e.g. from tests) leaves the first subscriber in place.
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trello_mcp=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

/// Run the server until interrupted.
pub async fn run<C: TrelloApi + 'static>(config: &Config, client: C) -> Result<(), ApiError> {
    init_tracing();

    let server = McpServer::new(Arc::new(client))?;
    let shutdown = CancellationToken::new();
    let state =
        AppState::new(server, shutdown.clone()).with_allowed_hosts(config.allowed_hosts.clone());
    if config.allowed_hosts.is_empty() {
        warn!("Host header check disabled on {}", streamable::MCP_PATH);
    }

    let app = routes::create_router(state).layer(TraceLayer::new_for_http());

    let addr = SocketAddr::new(config.host, config.port);
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ApiError::Bind { addr, source })?;
    info!("Trello MCP server listening on http://{}", addr);
    info!("streamable HTTP endpoint: http://{}{}", addr, streamable::MCP_PATH);
    info!("SSE endpoint: http://{}{}", addr, sse::SSE_PATH);

    // Cancelling ends open event streams and session services so graceful
    // shutdown can finish.
    let token = shutdown.clone();
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            token.cancel();
        })
        .await;

    shutdown.cancel();
    served.map_err(ApiError::Serve)?;

    info!("server stopped");
    Ok(())
}
