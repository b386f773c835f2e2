//! Application state for the HTTP front door.

use std::sync::Arc;

use rmcp::transport::streamable_http_server::session::local::LocalSessionHandle;
use tokio_util::sync::CancellationToken;

use super::session::SessionStore;
use super::sse::SseChannel;
use super::streamable::StreamableSessions;
use crate::config::default_allowed_hosts;
use crate::mcp::McpServer;
use crate::trello::TrelloApi;

/// Shared application state.
///
/// Generic over `C: TrelloApi` so routes can be exercised against a mock
/// Trello client. Each transport kind gets its own session store.
pub struct AppState<C> {
    server: Arc<McpServer<C>>,
    streamable: Arc<StreamableSessions>,
    sse: Arc<SessionStore<SseChannel>>,
    allowed_hosts: Arc<[String]>,
    shutdown: CancellationToken,
}

// Manual Clone impl - only the Arcs are cloned, C need not be Clone
impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            server: Arc::clone(&self.server),
            streamable: Arc::clone(&self.streamable),
            sse: Arc::clone(&self.sse),
            allowed_hosts: Arc::clone(&self.allowed_hosts),
            shutdown: self.shutdown.clone(),
        }
    }
}

impl<C: TrelloApi> AppState<C> {
    pub fn new(server: McpServer<C>, shutdown: CancellationToken) -> Self {
        Self {
            server: Arc::new(server),
            streamable: Arc::new(
                StreamableSessions::default().with_cancellation_token(shutdown.child_token()),
            ),
            sse: Arc::new(SessionStore::new("sse")),
            allowed_hosts: default_allowed_hosts().into(),
            shutdown,
        }
    }

    /// Hosts accepted in the `Host` header on `/mcp`. Empty accepts any.
    pub fn with_allowed_hosts(mut self, hosts: Vec<String>) -> Self {
        self.allowed_hosts = hosts.into();
        self
    }

    /// Replace the streamable session manager (e.g. for a shorter idle
    /// timeout).
    pub fn with_streamable_sessions(mut self, sessions: StreamableSessions) -> Self {
        self.streamable =
            Arc::new(sessions.with_cancellation_token(self.shutdown.child_token()));
        self
    }

    /// Get a cloned Arc to the MCP server, for work spawned off the
    /// request task.
    pub fn server(&self) -> Arc<McpServer<C>> {
        Arc::clone(&self.server)
    }

    pub fn streamable(&self) -> &Arc<StreamableSessions> {
        &self.streamable
    }

    pub fn streamable_sessions(&self) -> &Arc<SessionStore<LocalSessionHandle>> {
        self.streamable.store()
    }

    pub fn sse_sessions(&self) -> &Arc<SessionStore<SseChannel>> {
        &self.sse
    }

    pub fn allowed_hosts(&self) -> &[String] {
        &self.allowed_hosts
    }

    /// Cancelled when the server begins shutting down.
    pub fn shutdown(&self) -> &CancellationToken {
        &self.shutdown
    }
}
