//! MCP server exposing a small set of Trello operations over streamable
//! HTTP and legacy SSE.

pub mod api;
pub mod config;
pub mod mcp;
pub mod trello;
