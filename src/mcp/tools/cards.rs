//! Card tool implementations

use reqwest::Method;
use rmcp::{schemars, schemars::JsonSchema};
use serde::{Deserialize, Serialize};

use crate::trello::models::{Card, CreatedCard, NewCard};
use crate::trello::{TrelloApi, TrelloResult};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateCardParams {
    #[serde(rename = "listId")]
    #[schemars(description = "ID of the list the card is created in", length(min = 1))]
    pub list_id: String,
    #[schemars(description = "Card title", length(min = 1))]
    pub name: String,
    #[schemars(description = "Card description (optional)")]
    pub desc: Option<String>,
}

impl From<CreateCardParams> for NewCard {
    fn from(params: CreateCardParams) -> Self {
        Self {
            list_id: params.list_id,
            name: params.name,
            desc: params.desc,
        }
    }
}

/// Create one card. Single POST; nothing to undo when it fails.
pub async fn create_card<C: TrelloApi + ?Sized>(
    client: &C,
    card: NewCard,
) -> TrelloResult<CreatedCard> {
    let created = client
        .call(Method::POST, "/cards", Some(card.into_form()))
        .await?;
    let card: Card = serde_json::from_value(created)?;
    Ok(card.into())
}
