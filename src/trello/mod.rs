//! Trello REST API access.
//!
//! - **client**: `TrelloApi` trait and its reqwest implementation
//! - **models**: narrowed board/list/card views
//! - **error**: `TrelloError` taxonomy

mod client;
mod error;
pub mod models;


#[cfg(test)]
pub use client::MockTrelloApi;
pub use client::{Credentials, Form, TRELLO_API_URL, TrelloApi, TrelloClient};
pub use error::{TrelloError, TrelloResult};
