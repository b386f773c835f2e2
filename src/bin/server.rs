//! Trello MCP server binary.
//!
//! Reads configuration from the environment, builds the concrete Trello
//! client and hands it to the API layer.

use miette::Diagnostic;
use thiserror::Error;
use trello_mcp::api::{self, ApiError};
use trello_mcp::config::{Config, ConfigError};
use trello_mcp::trello::TrelloClient;

#[derive(Error, Diagnostic, Debug)]
enum BinaryError {
    #[error("Configuration error: {0}")]
    #[diagnostic(code(trello_mcp::binary::config))]
    Config(#[from] ConfigError),

    #[error("Failed to install TLS crypto provider")]
    #[diagnostic(code(trello_mcp::binary::tls))]
    CryptoProvider,

    #[error("API server error: {0}")]
    #[diagnostic(code(trello_mcp::binary::api))]
    Api(#[from] ApiError),
}

#[tokio::main]
async fn main() -> Result<(), BinaryError> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| BinaryError::CryptoProvider)?;

    let config = Config::from_env()?;
    let client = TrelloClient::new(config.credentials.clone());

    api::run(&config, client).await?;
    Ok(())
}
