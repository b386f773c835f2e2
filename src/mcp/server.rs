//! MCP server implementation
//!
//! [`McpServer`] is the rmcp `ServerHandler` for every transport. rmcp owns
//! the JSON-RPC framing and the lifecycle; this type answers `tools/list`
//! and `tools/call` from the [`ToolRegistry`].

use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    model::{
        CallToolRequestParams, CallToolResult, Content, Implementation, ListToolsResult,
        PaginatedRequestParams, ServerCapabilities, ServerInfo, Tool,
    },
    service::RequestContext,
};
use serde_json::{Value, json};
use tracing::{debug, warn};

use super::error::ToolError;
use super::registry::ToolRegistry;
use super::validation::JsonObject;
use crate::config::ConfigResult;
use crate::trello::TrelloApi;

pub const SERVER_NAME: &str = "trello-mcp";

const INSTRUCTIONS: &str = "Trello MCP Server - List boards and their lists, and create cards";

/// Main MCP server coordinator
///
/// Generic over `C: TrelloApi` so tests can drive it with a mock client.
/// Shared between sessions behind an `Arc`.
pub struct McpServer<C: ?Sized> {
    registry: ToolRegistry<C>,
}

impl<C: TrelloApi + ?Sized> McpServer<C> {
    /// Create a server exposing every Trello tool through `client`.
    pub fn new(client: Arc<C>) -> ConfigResult<Self> {
        Ok(Self::with_registry(ToolRegistry::with_trello_tools(client)?))
    }

    pub fn with_registry(registry: ToolRegistry<C>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry<C> {
        &self.registry
    }

    pub fn server_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_instructions(INSTRUCTIONS)
            .with_server_info(Implementation::new(
                SERVER_NAME,
                env!("CARGO_PKG_VERSION"),
            ))
    }

    /// Run a tool and wrap its output as an MCP tool result.
    ///
    /// Unknown tools and invalid input are protocol errors (`-32602`).
    /// Trello failures are tool results flagged `isError`, carrying the
    /// status and body unchanged.
    pub async fn invoke_tool(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let input = Value::Object(arguments.unwrap_or_default());

        match self.registry.invoke(name, input).await {
            Ok(output) => {
                let content = serde_json::to_string_pretty(&output).map_err(|e| {
                    McpError::internal_error(
                        "serialization_error",
                        Some(json!({"error": e.to_string()})),
                    )
                })?;
                Ok(CallToolResult::success(vec![Content::text(content)]))
            }
            Err(ToolError::UnknownTool { name }) => Err(McpError::invalid_params(
                format!("Unknown tool: {name}"),
                None,
            )),
            Err(ToolError::Validation(err)) => Err(McpError::invalid_params(
                err.to_string(),
                Some(json!({"fields": err.issues})),
            )),
            Err(ToolError::Trello(err)) => {
                warn!(tool = name, error = %err, "tool call failed");
                Ok(CallToolResult::error(vec![Content::text(err.to_string())]))
            }
        }
    }
}

impl<C: TrelloApi + ?Sized + 'static> ServerHandler for McpServer<C> {
    fn get_info(&self) -> ServerInfo {
        self.server_info()
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(self.registry.tools()))
    }

    fn get_tool(&self, name: &str) -> Option<Tool> {
        self.registry.get(name).map(|descriptor| descriptor.to_tool())
    }

    // Calls run to completion even if the client cancels.
    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        debug!(tool = %request.name, "tools/call");
        self.invoke_tool(&request.name, request.arguments).await
    }
}
