//! Tests for the MCP server handler

use std::sync::Arc;
use std::time::Duration;

use rmcp::model::{ClientJsonRpcMessage, RawContent, ServerJsonRpcMessage};
use rmcp::{ServerHandler, ServiceExt};
use serde_json::{Value, json};
use tokio::sync::mpsc;

use crate::mcp::{ChannelTransport, McpServer};
use crate::trello::{MockTrelloApi, TrelloError};

fn server(mock: MockTrelloApi) -> McpServer<MockTrelloApi> {
    McpServer::new(Arc::new(mock)).expect("tools register")
}

fn idle_server() -> McpServer<MockTrelloApi> {
    let mut mock = MockTrelloApi::new();
    mock.expect_call().never();
    server(mock)
}

/// A served session: client messages in, server messages out.
struct Session {
    to_server: mpsc::Sender<ClientJsonRpcMessage>,
    from_server: mpsc::Receiver<ServerJsonRpcMessage>,
}

impl Session {
    fn start(server: McpServer<MockTrelloApi>) -> Self {
        let (transport, to_server, from_server) = ChannelTransport::pair(8);
        tokio::spawn(async move {
            if let Ok(running) = Arc::new(server).serve(transport).await {
                let _ = running.waiting().await;
            }
        });
        Self {
            to_server,
            from_server,
        }
    }

    async fn send(&self, message: Value) {
        let message: ClientJsonRpcMessage = serde_json::from_value(message).unwrap();
        self.to_server.send(message).await.unwrap();
    }

    async fn recv(&mut self) -> Value {
        let message = tokio::time::timeout(Duration::from_secs(5), self.from_server.recv())
            .await
            .expect("reply within timeout")
            .expect("session still open");
        serde_json::to_value(message).unwrap()
    }

    async fn request(&mut self, id: u64, method: &str, params: Value) -> Value {
        self.send(json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params}))
            .await;
        self.recv().await
    }

    /// Start a session and complete the handshake.
    async fn initialized(server: McpServer<MockTrelloApi>) -> Self {
        let mut session = Self::start(server);
        let response = session.request(0, "initialize", initialize_params()).await;
        assert_eq!(response["id"], 0);
        session
            .send(json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
            .await;
        session
    }
}

fn initialize_params() -> Value {
    json!({
        "protocolVersion": "2025-03-26",
        "capabilities": {},
        "clientInfo": {"name": "inspector", "version": "0.9.0"}
    })
}

#[test]
fn test_server_info() {
    let info = idle_server().get_info();

    assert!(info.capabilities.tools.is_some(), "Server should support tools");
    assert!(info.instructions.is_some(), "Server should provide instructions");
    assert_eq!(info.server_info.name, "trello-mcp");
    assert_eq!(info.server_info.version, env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_get_tool() {
    let server = idle_server();

    let tool = server.get_tool("trello_create_card").expect("tool is registered");
    assert_eq!(tool.name, "trello_create_card");
    assert!(server.get_tool("trello_archive_board").is_none());
}

#[tokio::test]
async fn test_initialize_answers_with_server_info() {
    let mut session = Session::start(idle_server());

    let response = session.request(1, "initialize", initialize_params()).await;

    assert_eq!(response["jsonrpc"], "2.0");
    assert_eq!(response["id"], 1);
    assert_eq!(response["result"]["serverInfo"]["name"], "trello-mcp");
    assert_eq!(response["result"]["protocolVersion"], "2025-03-26");
    assert!(response["result"]["capabilities"]["tools"].is_object());
}

#[tokio::test]
async fn test_ping() {
    let mut session = Session::initialized(idle_server()).await;
    let response = session.request(3, "ping", json!({})).await;
    assert_eq!(response["id"], 3);
    assert_eq!(response["result"], json!({}));
}

#[tokio::test]
async fn test_tools_list() {
    let mut session = Session::initialized(idle_server()).await;
    let response = session.request(4, "tools/list", json!({})).await;

    let names: Vec<&str> = response["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["trello_list_boards", "trello_list_lists", "trello_create_card"]
    );
    assert_eq!(
        response["result"]["tools"][1]["inputSchema"]["required"],
        json!(["boardId"])
    );
}

#[tokio::test]
async fn test_unknown_method() {
    let mut session = Session::initialized(idle_server()).await;
    let response = session.request(5, "boards/archive", json!({})).await;
    assert_eq!(response["id"], 5);
    assert_eq!(response["error"]["code"], -32601);
}

#[tokio::test]
async fn test_tools_call_success_wraps_json_text() {
    let mut mock = MockTrelloApi::new();
    mock.expect_call()
        .times(1)
        .returning(|_, _, _| Ok(json!([{"id": "l1", "name": "Todo", "closed": false}])));
    let server = server(mock);

    let result = server
        .invoke_tool(
            "trello_list_lists",
            json!({"boardId": "b1"}).as_object().cloned(),
        )
        .await
        .unwrap();

    assert_ne!(result.is_error, Some(true));
    let text = match &result.content[0].raw {
        RawContent::Text(text) => text.text.as_str(),
        _ => panic!("Expected text content"),
    };
    let lists: Value = serde_json::from_str(text).unwrap();
    assert_eq!(lists, json!([{"id": "l1", "name": "Todo"}]));
}

#[tokio::test]
async fn test_tools_call_validation_error_is_invalid_params() {
    let mut session = Session::initialized(idle_server()).await;

    let response = session
        .request(
            6,
            "tools/call",
            json!({"name": "trello_list_lists", "arguments": {}}),
        )
        .await;

    assert_eq!(response["error"]["code"], -32602);
    assert_eq!(response["error"]["data"]["fields"][0]["field"], "boardId");
}

#[tokio::test]
async fn test_tools_call_unknown_tool_is_invalid_params() {
    let mut session = Session::initialized(idle_server()).await;

    let response = session
        .request(7, "tools/call", json!({"name": "trello_archive_board"}))
        .await;

    assert_eq!(response["error"]["code"], -32602);
}

#[tokio::test]
async fn test_tools_call_unauthorized_surfaces_status_and_body() {
    let mut mock = MockTrelloApi::new();
    mock.expect_call().times(1).returning(|_, _, _| {
        Err(TrelloError::RemoteApi {
            status: 401,
            status_text: "Unauthorized".to_string(),
            body: "invalid token".to_string(),
        })
    });
    let mut session = Session::initialized(server(mock)).await;

    let response = session
        .request(
            8,
            "tools/call",
            json!({"name": "trello_list_boards", "arguments": {}}),
        )
        .await;

    assert_eq!(response["result"]["isError"], true);
    let text = response["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("401"));
    assert!(text.contains("invalid token"));
}
