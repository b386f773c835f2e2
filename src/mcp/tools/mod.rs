//! Trello tool implementations
//!
//! Each tool is one variant of [`TrelloTool`]. A variant knows its metadata,
//! how to turn raw JSON input into a typed [`ToolInput`], and that input
//! knows how to execute itself against a [`TrelloApi`].

mod boards;
mod cards;


use std::sync::Arc;

use rmcp::schemars::{self, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::{FieldIssue, ValidationError};
use super::registry::ToolDescriptor;
use super::validation::JsonObject;
use crate::trello::{TrelloApi, TrelloResult};

pub use boards::{ListBoardsParams, ListListsParams, list_boards, list_lists};
pub use cards::{CreateCardParams, create_card};

/// Handler tag for each Trello tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrelloTool {
    ListBoards,
    ListLists,
    CreateCard,
}

impl TrelloTool {
    /// All tools, in registration order.
    pub const ALL: [TrelloTool; 3] = [Self::ListBoards, Self::ListLists, Self::CreateCard];

    pub fn name(self) -> &'static str {
        match self {
            Self::ListBoards => "trello_list_boards",
            Self::ListLists => "trello_list_lists",
            Self::CreateCard => "trello_create_card",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::ListBoards => "List Trello boards",
            Self::ListLists => "List lists on a board",
            Self::CreateCard => "Create a Trello card",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::ListBoards => "List boards for the authenticated user",
            Self::ListLists => "Given a boardId, list its lists (columns)",
            Self::CreateCard => "Create a card in a given list",
        }
    }

    pub fn input_schema(self) -> Arc<JsonObject> {
        match self {
            Self::ListBoards => schema_for::<ListBoardsParams>(),
            Self::ListLists => schema_for::<ListListsParams>(),
            Self::CreateCard => schema_for::<CreateCardParams>(),
        }
    }

    pub fn descriptor(self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name().to_string(),
            title: self.title().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
            handler: self,
        }
    }

    /// Decode structurally valid input into the tool's typed parameters.
    pub fn parse(self, input: Value) -> Result<ToolInput, ValidationError> {
        match self {
            Self::ListBoards => decode(self, input).map(ToolInput::ListBoards),
            Self::ListLists => {
                let params: ListListsParams = decode(self, input)?;
                ensure_path_segment(self, "boardId", &params.board_id)?;
                Ok(ToolInput::ListLists(params))
            }
            Self::CreateCard => decode(self, input).map(ToolInput::CreateCard),
        }
    }
}

/// Validated input for one invocation.
#[derive(Debug)]
pub enum ToolInput {
    ListBoards(ListBoardsParams),
    ListLists(ListListsParams),
    CreateCard(CreateCardParams),
}

impl ToolInput {
    /// Run the tool and return its output value.
    pub async fn execute<C: TrelloApi + ?Sized>(self, client: &C) -> TrelloResult<Value> {
        let output = match self {
            Self::ListBoards(_) => serde_json::to_value(list_boards(client).await?)?,
            Self::ListLists(params) => {
                serde_json::to_value(list_lists(client, &params.board_id).await?)?
            }
            Self::CreateCard(params) => {
                serde_json::to_value(create_card(client, params.into()).await?)?
            }
        };
        Ok(output)
    }
}

fn schema_for<T: JsonSchema>() -> Arc<JsonObject> {
    let schema = schemars::schema_for!(T);
    match serde_json::to_value(schema) {
        Ok(Value::Object(mut map)) => {
            map.remove("$schema");
            Arc::new(map)
        }
        _ => Arc::new(JsonObject::new()),
    }
}

fn decode<T: DeserializeOwned>(tool: TrelloTool, input: Value) -> Result<T, ValidationError> {
    serde_json::from_value(input)
        .map_err(|e| ValidationError::single(tool.name(), "input", e.to_string()))
}

/// Identifiers end up in the request path; refuse anything that would
/// change which endpoint is hit.
fn ensure_path_segment(tool: TrelloTool, field: &str, value: &str) -> Result<(), ValidationError> {
    let unsafe_char = |c: char| matches!(c, '/' | '?' | '#' | '%' | '\\') || c.is_whitespace();
    if value.contains(unsafe_char) || value == "." || value == ".." {
        return Err(ValidationError::new(
            tool.name(),
            vec![FieldIssue::new(field, "must be a Trello ID")],
        ));
    }
    Ok(())
}
