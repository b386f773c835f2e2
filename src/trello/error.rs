//! Trello client error types.

use miette::Diagnostic;
use thiserror::Error;

/// Errors raised while talking to the Trello REST API.
///
/// None of these are retried. They are surfaced verbatim to whoever
/// invoked the tool.
#[derive(Error, Diagnostic, Debug)]
pub enum TrelloError {
    /// Trello answered with a non-success status.
    #[error("{status} {status_text}: {body}")]
    #[diagnostic(code(trello_mcp::trello::remote_api))]
    RemoteApi {
        status: u16,
        status_text: String,
        body: String,
    },

    /// The request never produced a response (DNS, connect, TLS, reset...).
    #[error("Failed to reach Trello: {source}")]
    #[diagnostic(
        code(trello_mcp::trello::transport),
        help("Check network connectivity to api.trello.com")
    )]
    Transport {
        #[source]
        source: reqwest::Error,
    },

    /// A success response whose body could not be decoded.
    #[error("Invalid response from Trello: {message}")]
    #[diagnostic(code(trello_mcp::trello::invalid_response))]
    InvalidResponse { message: String },
}

impl From<reqwest::Error> for TrelloError {
    fn from(e: reqwest::Error) -> Self {
        // The request URL carries key and token in its query string.
        let e = e.without_url();
        if e.is_decode() {
            TrelloError::InvalidResponse {
                message: e.to_string(),
            }
        } else {
            TrelloError::Transport { source: e }
        }
    }
}

impl From<serde_json::Error> for TrelloError {
    fn from(e: serde_json::Error) -> Self {
        TrelloError::InvalidResponse {
            message: e.to_string(),
        }
    }
}

pub type TrelloResult<T> = Result<T, TrelloError>;
