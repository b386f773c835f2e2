//! API route configuration.

use axum::Router;
use axum::middleware;
use axum::routing::{any_service, get, post};

use super::handlers;
use super::sse::{self, MESSAGES_PATH, SSE_PATH};
use super::state::AppState;
use super::streamable::{self, MCP_PATH};
use crate::trello::TrelloApi;

/// Create the router serving both MCP transports.
pub fn create_router<C: TrelloApi + 'static>(state: AppState<C>) -> Router {
    let mcp = any_service(streamable::service(&state))
        .layer(middleware::from_fn(streamable::require_readable_session_id));

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route(MCP_PATH, mcp)
        .route(SSE_PATH, get(sse::open_stream::<C>))
        .route(MESSAGES_PATH, post(sse::post_message::<C>))
        .with_state(state)
}
