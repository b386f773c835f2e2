//! Legacy HTTP+SSE transport.
//!
//! `GET /sse` opens an event stream whose first event names the endpoint to
//! POST messages to. Each stream gets its own rmcp service over a
//! [`ChannelTransport`]; replies to POSTed messages come back as `message`
//! events on the stream, not in the POST response.

use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures_util::stream::{self, Stream, StreamExt};
use rmcp::ServiceExt;
use rmcp::model::{ClientJsonRpcMessage, ServerJsonRpcMessage};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

use super::session::SessionGuard;
use super::state::AppState;
use crate::mcp::ChannelTransport;
use crate::trello::TrelloApi;

pub const SSE_PATH: &str = "/sse";
pub const MESSAGES_PATH: &str = "/messages";

/// Messages buffered per direction before senders wait.
const CHANNEL_BUFFER: usize = 32;

const NO_TRANSPORT: &str = "No transport found for sessionId";

/// Per-session state for an SSE client: the way into its rmcp service.
pub struct SseChannel {
    inbound: mpsc::Sender<ClientJsonRpcMessage>,
}

impl SseChannel {
    pub fn new(inbound: mpsc::Sender<ClientJsonRpcMessage>) -> Self {
        Self { inbound }
    }

    /// Hand a message to the session. False once its service has stopped.
    pub async fn send(&self, message: ClientJsonRpcMessage) -> bool {
        self.inbound.send(message).await.is_ok()
    }
}

#[derive(Debug, Deserialize)]
pub struct MessagesQuery {
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

fn message_event(message: &ServerJsonRpcMessage) -> Option<Event> {
    match serde_json::to_string(message) {
        Ok(json) => Some(Event::default().event("message").data(json)),
        Err(e) => {
            error!(error = %e, "failed to encode message");
            None
        }
    }
}

/// GET /sse
#[instrument(skip_all)]
pub async fn open_stream<C: TrelloApi + 'static>(
    State(state): State<AppState<C>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (transport, inbound, outbound) = ChannelTransport::pair(CHANNEL_BUFFER);
    let store = state.sse_sessions();
    let (id, _) = store.create(SseChannel::new(inbound));
    info!(session_id = %id, "SSE session opened");

    let server = state.server();
    let cancel = state.shutdown().child_token();
    let session_id = id.clone();
    tokio::spawn(async move {
        match server.serve_with_ct(transport, cancel).await {
            Ok(running) => {
                if let Err(e) = running.waiting().await {
                    error!(session_id = %session_id, error = %e, "SSE session task failed");
                }
            }
            Err(e) => warn!(session_id = %session_id, error = %e, "SSE session not initialized"),
        }
        debug!(session_id = %session_id, "SSE session service stopped");
    });

    let endpoint = Event::default()
        .event("endpoint")
        .data(format!("{MESSAGES_PATH}?sessionId={id}"));

    // The guard rides along with the stream: dropping the response closes
    // the session, which in turn stops its service.
    let guard = SessionGuard::new(Arc::clone(store), id);
    let messages = stream::unfold((outbound, guard), |(mut outbound, guard)| async move {
        loop {
            let message = outbound.recv().await?;
            if let Some(event) = message_event(&message) {
                return Some((event, (outbound, guard)));
            }
        }
    });

    let events = stream::once(async move { endpoint })
        .chain(messages)
        .take_until(state.shutdown().clone().cancelled_owned())
        .map(Ok);

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// POST /messages?sessionId=<id>
///
/// Accepted messages are answered on the session's event stream.
#[instrument(skip_all)]
pub async fn post_message<C: TrelloApi + 'static>(
    State(state): State<AppState<C>>,
    Query(query): Query<MessagesQuery>,
    body: Bytes,
) -> Response {
    let Some(id) = query.session_id else {
        warn!("message without sessionId");
        return (StatusCode::BAD_REQUEST, NO_TRANSPORT).into_response();
    };
    let Some(channel) = state.sse_sessions().get(&id) else {
        warn!(session_id = %id, "no SSE session for message");
        return (StatusCode::BAD_REQUEST, NO_TRANSPORT).into_response();
    };

    let message: ClientJsonRpcMessage = match serde_json::from_slice(&body) {
        Ok(message) => message,
        Err(e) => {
            warn!(session_id = %id, error = %e, "rejecting malformed message");
            return (StatusCode::BAD_REQUEST, format!("Invalid message: {e}")).into_response();
        }
    };

    if !channel.send(message).await {
        // The service stopped (e.g. the first message was not initialize).
        state.sse_sessions().remove(&id);
        return (StatusCode::BAD_REQUEST, NO_TRANSPORT).into_response();
    }

    (StatusCode::ACCEPTED, "Accepted").into_response()
}
