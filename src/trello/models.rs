//! Narrow views over Trello resources.
//!
//! Trello returns large objects; only the fields the tools hand back are
//! decoded; everything else is ignored.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: String,
    pub name: String,
}

/// A list (column) on a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardList {
    pub id: String,
    pub name: String,
}

/// Card as returned by `POST /cards`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Card {
    pub id: String,
    pub name: String,
    #[serde(rename = "shortUrl")]
    pub short_url: String,
}

/// Card projection handed back to MCP clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedCard {
    pub id: String,
    pub url: String,
    pub name: String,
}

impl From<Card> for CreatedCard {
    fn from(card: Card) -> Self {
        Self {
            id: card.id,
            url: card.short_url,
            name: card.name,
        }
    }
}

/// Fields for `POST /cards`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCard {
    pub list_id: String,
    pub name: String,
    pub desc: Option<String>,
}

impl NewCard {
    /// Encode as form pairs. `desc` is left out entirely when absent or empty.
    pub fn into_form(self) -> Vec<(String, String)> {
        let mut form = vec![
            ("idList".to_string(), self.list_id),
            ("name".to_string(), self.name),
        ];
        if let Some(desc) = self.desc.filter(|d| !d.is_empty()) {
            form.push(("desc".to_string(), desc));
        }
        form
    }
}
