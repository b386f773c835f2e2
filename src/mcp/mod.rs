//! Model Context Protocol (MCP) server implementation
//!
//! Transport-agnostic: rmcp drives the JSON-RPC lifecycle and calls into
//! [`McpServer`] for tool listing and invocation.
//!
//! # Architecture
//!
//! - **server**: the rmcp `ServerHandler`
//! - **registry**: ordered tool declarations, validate-then-execute
//! - **validation**: structural input checks against each tool's schema
//! - **tools**: the Trello tools themselves
//! - **transport**: queue-backed transport for front ends rmcp has no server for

pub mod error;
pub mod registry;
pub mod server;
pub mod tools;
pub mod transport;
pub mod validation;

#[cfg(test)]
mod server_test;

pub use error::{FieldIssue, ToolError, ValidationError};
pub use registry::{ToolDescriptor, ToolRegistry};
pub use server::McpServer;
pub use tools::{ToolInput, TrelloTool};
pub use transport::{ChannelClosed, ChannelTransport};
