//! Authenticated HTTP client for the Trello REST API.

use std::fmt;

use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde_json::Value;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

use super::error::{TrelloError, TrelloResult};

/// Public Trello API root.
pub const TRELLO_API_URL: &str = "https://api.trello.com/1";

/// URL-encoded form body as ordered key/value pairs.
pub type Form = Vec<(String, String)>;

/// Access to the Trello REST API. Can be mocked in tests.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TrelloApi: Send + Sync {
    /// Issue `method` against `path` (relative to the API root, starting
    /// with `/`) and decode the JSON response.
    ///
    /// Implementations must attach the account credentials to every request.
    async fn call(&self, method: Method, path: &str, form: Option<Form>) -> TrelloResult<Value>;
}

/// API key and token pair.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    key: String,
    token: String,
}

impl Credentials {
    pub fn new(key: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            token: token.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &"<redacted>")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// reqwest-backed [`TrelloApi`] implementation.
#[derive(Clone, Debug)]
pub struct TrelloClient {
    base_url: String,
    credentials: Credentials,
    client: Client,
}

impl TrelloClient {
    /// Create a client against the public Trello API.
    pub fn new(credentials: Credentials) -> Self {
        Self::with_base_url(TRELLO_API_URL, credentials)
    }

    /// Create a client against an alternative API root (used by tests).
    pub fn with_base_url(base_url: impl Into<String>, credentials: Credentials) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            base_url,
            credentials,
            client: Client::new(),
        }
    }

    /// Get the base URL being used
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Decode a success body as JSON, or turn a failure status into
    /// [`TrelloError::RemoteApi`] carrying the raw body.
    async fn handle_response(response: Response) -> TrelloResult<Value> {
        let status = response.status();
        if status.is_success() {
            let body = response.bytes().await?;
            Ok(serde_json::from_slice(&body)?)
        } else {
            let body = response.text().await?;
            Err(TrelloError::RemoteApi {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                body,
            })
        }
    }
}

#[async_trait]
impl TrelloApi for TrelloClient {
    async fn call(&self, method: Method, path: &str, form: Option<Form>) -> TrelloResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, path, "calling Trello");

        let mut request = self.client.request(method, &url).query(&[
            ("key", self.credentials.key()),
            ("token", self.credentials.token()),
        ]);
        if let Some(form) = form {
            request = request.form(&form);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }
}
