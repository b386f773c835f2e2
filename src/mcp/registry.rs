//! Tool registry
//!
//! Holds the tool declarations in registration order and routes
//! invocations: look up, validate, execute. Nothing is retried or swallowed;
//! handler errors reach the caller unchanged.

use std::sync::Arc;

use rmcp::model::Tool;
use serde_json::Value;
use tracing::debug;

use super::error::{ToolError, ToolResult, ValidationError};
use super::tools::{ToolInput, TrelloTool};
use super::validation::{JsonObject, validate_input};
use crate::config::{ConfigError, ConfigResult};
use crate::trello::TrelloApi;

/// Declaration of one callable tool.
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    pub name: String,
    pub title: String,
    pub description: String,
    pub input_schema: Arc<JsonObject>,
    pub handler: TrelloTool,
}

impl ToolDescriptor {
    /// MCP `Tool` advertised through `tools/list`.
    pub fn to_tool(&self) -> Tool {
        let mut tool = Tool::new(
            self.name.clone(),
            self.description.clone(),
            Arc::clone(&self.input_schema),
        );
        tool.title = Some(self.title.clone());
        tool
    }

    /// Schema check first, then typed decoding. No I/O happens here.
    pub fn validate(&self, input: Value) -> Result<ToolInput, ValidationError> {
        validate_input(&self.name, &self.input_schema, &input)?;
        self.handler.parse(input)
    }
}

/// Insertion-ordered set of tools bound to one Trello client.
pub struct ToolRegistry<C: ?Sized> {
    tools: Vec<ToolDescriptor>,
    client: Arc<C>,
}

impl<C: TrelloApi + ?Sized> ToolRegistry<C> {
    /// Create an empty registry.
    pub fn new(client: Arc<C>) -> Self {
        Self {
            tools: Vec::new(),
            client,
        }
    }

    /// Create a registry with every Trello tool registered.
    pub fn with_trello_tools(client: Arc<C>) -> ConfigResult<Self> {
        let mut registry = Self::new(client);
        for tool in TrelloTool::ALL {
            registry.register(tool.descriptor())?;
        }
        Ok(registry)
    }

    /// Add a tool. Names must be unique.
    pub fn register(&mut self, descriptor: ToolDescriptor) -> ConfigResult<()> {
        if self.get(&descriptor.name).is_some() {
            return Err(ConfigError::DuplicateTool {
                name: descriptor.name,
            });
        }
        debug!(tool = %descriptor.name, "registered tool");
        self.tools.push(descriptor);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|t| t.name == name)
    }

    pub fn descriptors(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    pub fn tools(&self) -> Vec<Tool> {
        self.tools.iter().map(ToolDescriptor::to_tool).collect()
    }

    /// Validate `input` for tool `name` and run it.
    ///
    /// The Trello client is only touched once validation has passed.
    pub async fn invoke(&self, name: &str, input: Value) -> ToolResult<Value> {
        let descriptor = self.get(name).ok_or_else(|| ToolError::UnknownTool {
            name: name.to_string(),
        })?;

        let input = descriptor.validate(input)?;
        debug!(tool = name, "invoking tool");

        Ok(input.execute(self.client.as_ref()).await?)
    }
}
