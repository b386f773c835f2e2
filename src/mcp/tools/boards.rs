//! Board and list tool implementations

use reqwest::Method;
use rmcp::{schemars, schemars::JsonSchema};
use serde::{Deserialize, Serialize};

use crate::trello::models::{Board, BoardList};
use crate::trello::{TrelloApi, TrelloResult};

/// `trello_list_boards` takes no input.
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListBoardsParams {}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ListListsParams {
    #[serde(rename = "boardId")]
    #[schemars(description = "Board ID (or short link)", length(min = 1))]
    pub board_id: String,
}

/// Every board the authenticated member belongs to, narrowed to `{id, name}`.
pub async fn list_boards<C: TrelloApi + ?Sized>(client: &C) -> TrelloResult<Vec<Board>> {
    let boards = client.call(Method::GET, "/members/me/boards", None).await?;
    Ok(serde_json::from_value(boards)?)
}

/// Lists (columns) of a board in the order Trello returns them.
pub async fn list_lists<C: TrelloApi + ?Sized>(
    client: &C,
    board_id: &str,
) -> TrelloResult<Vec<BoardList>> {
    let path = format!("/boards/{board_id}/lists");
    let lists = client.call(Method::GET, &path, None).await?;
    Ok(serde_json::from_value(lists)?)
}
