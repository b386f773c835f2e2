//! Streamable HTTP transport at `/mcp`.
//!
//! rmcp's `StreamableHttpService` speaks the protocol. Sessions live in a
//! [`SessionStore`] through [`StreamableSessions`], so the store always
//! reflects which sessions are open: an entry goes away on DELETE, when its
//! session worker stops (idle timeout, shutdown), or when the opening
//! request turns out not to be `initialize`.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use axum::body::Body;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use futures_util::stream::{self, Stream, StreamExt};
use rmcp::RoleServer;
use rmcp::model::{ClientJsonRpcMessage, ServerJsonRpcMessage};
use rmcp::service::{RxJsonRpcMessage, TxJsonRpcMessage};
use rmcp::transport::streamable_http_server::session::local::{
    EventIdParseError, LocalSessionHandle, LocalSessionWorker, LocalSessionWorkerError,
    SessionConfig, SessionError, create_local_session,
};
use rmcp::transport::streamable_http_server::session::{
    ServerSseMessage, SessionId, SessionManager,
};
use rmcp::transport::{
    StreamableHttpServerConfig, StreamableHttpService, Transport, WorkerTransport,
};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::session::{SessionGuard, SessionStore};
use super::state::AppState;
use crate::mcp::McpServer;
use crate::trello::TrelloApi;

pub const MCP_PATH: &str = "/mcp";
pub const MCP_SESSION_ID: &str = "mcp-session-id";

/// Sessions idle longer than this are closed.
pub const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

#[derive(Error, Debug)]
pub enum StreamableSessionError {
    #[error("Session not found: {0}")]
    NotFound(SessionId),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Invalid event id: {0}")]
    InvalidEventId(#[from] EventIdParseError),
}

/// rmcp session manager over the crate's [`SessionStore`].
pub struct StreamableSessions {
    store: Arc<SessionStore<LocalSessionHandle>>,
    config: SessionConfig,
    shutdown: CancellationToken,
}

impl Default for StreamableSessions {
    fn default() -> Self {
        Self::new(SESSION_IDLE_TIMEOUT)
    }
}

impl StreamableSessions {
    pub fn new(idle_timeout: Duration) -> Self {
        let mut config = SessionConfig::default();
        config.keep_alive = Some(idle_timeout);
        Self {
            store: Arc::new(SessionStore::new("streamable")),
            config,
            shutdown: CancellationToken::new(),
        }
    }

    /// Stop every session worker once `token` is cancelled.
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub fn store(&self) -> &Arc<SessionStore<LocalSessionHandle>> {
        &self.store
    }

    fn handle(&self, id: &SessionId) -> Result<Arc<LocalSessionHandle>, StreamableSessionError> {
        self.store
            .get(id)
            .ok_or_else(|| StreamableSessionError::NotFound(id.clone()))
    }
}

/// Session worker transport. Dropping it closes the session in the store.
pub struct SessionTransport {
    inner: WorkerTransport<LocalSessionWorker>,
    _guard: SessionGuard<LocalSessionHandle>,
}

impl Transport<RoleServer> for SessionTransport {
    type Error = LocalSessionWorkerError;

    fn send(
        &mut self,
        item: TxJsonRpcMessage<RoleServer>,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'static {
        self.inner.send(item)
    }

    async fn receive(&mut self) -> Option<RxJsonRpcMessage<RoleServer>> {
        self.inner.receive().await
    }

    async fn close(&mut self) -> Result<(), Self::Error> {
        self.inner.close().await
    }
}

/// Event stream over one session channel.
struct MessageStream(mpsc::Receiver<ServerSseMessage>);

impl Stream for MessageStream {
    type Item = ServerSseMessage;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.0.poll_recv(cx)
    }
}

impl SessionManager for StreamableSessions {
    type Error = StreamableSessionError;
    type Transport = SessionTransport;

    async fn create_session(&self) -> Result<(SessionId, Self::Transport), Self::Error> {
        let (id, _, worker) = self
            .store
            .create_with(|id| create_local_session(id, self.config.clone()));
        info!(session_id = %id, "streamable session opened");
        let guard = SessionGuard::new(Arc::clone(&self.store), id.clone());
        let transport = SessionTransport {
            inner: WorkerTransport::spawn_with_ct(worker, self.shutdown.child_token()),
            _guard: guard,
        };
        Ok((id.into(), transport))
    }

    async fn initialize_session(
        &self,
        id: &SessionId,
        message: ClientJsonRpcMessage,
    ) -> Result<ServerJsonRpcMessage, Self::Error> {
        Ok(self.handle(id)?.initialize(message).await?)
    }

    async fn has_session(&self, id: &SessionId) -> Result<bool, Self::Error> {
        Ok(self.store.contains(id))
    }

    async fn close_session(&self, id: &SessionId) -> Result<(), Self::Error> {
        let Some(handle) = self.store.remove(id) else {
            return Ok(());
        };
        info!(session_id = %id, "streamable session closed");
        match handle.close().await {
            Ok(()) | Err(SessionError::SessionServiceTerminated) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn create_stream(
        &self,
        id: &SessionId,
        message: ClientJsonRpcMessage,
    ) -> Result<impl Stream<Item = ServerSseMessage> + Send + Sync + 'static, Self::Error> {
        let handle = self.handle(id)?;
        let receiver = handle.establish_request_wise_channel().await?;
        let http_request_id = receiver.http_request_id;
        handle.push_message(message, http_request_id).await?;

        // Priming event lets the client resume this stream by event id.
        let priming = self.config.sse_retry.map(|retry| {
            let event_id = match http_request_id {
                Some(request) => format!("0/{request}"),
                None => "0".to_string(),
            };
            ServerSseMessage::priming(event_id, retry)
        });
        Ok(stream::iter(priming).chain(MessageStream(receiver.inner)))
    }

    async fn accept_message(
        &self,
        id: &SessionId,
        message: ClientJsonRpcMessage,
    ) -> Result<(), Self::Error> {
        self.handle(id)?.push_message(message, None).await?;
        Ok(())
    }

    async fn create_standalone_stream(
        &self,
        id: &SessionId,
    ) -> Result<impl Stream<Item = ServerSseMessage> + Send + Sync + 'static, Self::Error> {
        let receiver = self.handle(id)?.establish_common_channel().await?;
        Ok(MessageStream(receiver.inner))
    }

    async fn resume(
        &self,
        id: &SessionId,
        last_event_id: String,
    ) -> Result<impl Stream<Item = ServerSseMessage> + Send + Sync + 'static, Self::Error> {
        let handle = self.handle(id)?;
        let receiver = handle.resume(last_event_id.parse()?).await?;
        Ok(MessageStream(receiver.inner))
    }
}

/// Build the rmcp service mounted at [`MCP_PATH`].
pub fn service<C: TrelloApi + 'static>(
    state: &AppState<C>,
) -> StreamableHttpService<Arc<McpServer<C>>, StreamableSessions> {
    let server = state.server();
    // An empty host list accepts any Host header.
    let config = StreamableHttpServerConfig::default()
        .with_cancellation_token(state.shutdown().child_token())
        .with_allowed_hosts(state.allowed_hosts().iter().cloned());
    StreamableHttpService::new(
        move || Ok(Arc::clone(&server)),
        Arc::clone(state.streamable()),
        config,
    )
}

/// Reject a session header that is present but not visible ASCII.
///
/// rmcp reads such a header as absent, which would turn the request into a
/// session-opening one.
pub async fn require_readable_session_id(request: Request, next: Next) -> Response {
    if let Some(value) = request.headers().get(MCP_SESSION_ID)
        && value.to_str().is_err()
    {
        warn!("rejecting unreadable session header");
        return (
            StatusCode::BAD_REQUEST,
            Body::from("Bad Request: Invalid mcp-session-id header"),
        )
            .into_response();
    }
    next.run(request).await
}
