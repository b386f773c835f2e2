//! Process configuration and startup errors.

use std::env;
use std::net::{IpAddr, Ipv4Addr};

use miette::Diagnostic;
use thiserror::Error;

use crate::trello::Credentials;

pub const PORT_VAR: &str = "PORT";
pub const KEY_VAR: &str = "TRELLO_KEY";
pub const TOKEN_VAR: &str = "TRELLO_TOKEN";
pub const ALLOWED_HOSTS_VAR: &str = "MCP_ALLOWED_HOSTS";

pub const DEFAULT_PORT: u16 = 3000;

/// Loopback names accepted in the `Host` header unless configured otherwise.
pub fn default_allowed_hosts() -> Vec<String> {
    ["localhost", "127.0.0.1", "::1"].map(String::from).to_vec()
}

/// Fatal startup errors.
#[derive(Error, Diagnostic, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable {name}")]
    #[diagnostic(
        code(trello_mcp::config::missing_var),
        help("Create an API key and token at https://trello.com/app-key and export TRELLO_KEY and TRELLO_TOKEN")
    )]
    MissingVar { name: &'static str },

    #[error("Invalid value for {name}: '{value}'")]
    #[diagnostic(
        code(trello_mcp::config::invalid_var),
        help("PORT must be a number between 0 and 65535")
    )]
    InvalidVar { name: &'static str, value: String },

    #[error("Tool '{name}' is registered more than once")]
    #[diagnostic(code(trello_mcp::config::duplicate_tool))]
    DuplicateTool { name: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host address to bind to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Trello account credentials
    pub credentials: Credentials,
    /// `Host` header values accepted on `/mcp`; empty accepts any
    pub allowed_hosts: Vec<String>,
}

impl Config {
    /// Build the configuration from the process environment.
    ///
    /// `PORT` falls back to 3000; `TRELLO_KEY` and `TRELLO_TOKEN` are required
    /// and must not be empty. `MCP_ALLOWED_HOSTS` is a comma-separated host
    /// list, `*` for any host, loopback only when unset.
    pub fn from_env() -> ConfigResult<Self> {
        let port = match env::var(PORT_VAR) {
            Ok(raw) if !raw.trim().is_empty() => {
                raw.trim()
                    .parse::<u16>()
                    .map_err(|_| ConfigError::InvalidVar {
                        name: PORT_VAR,
                        value: raw.clone(),
                    })?
            }
            _ => DEFAULT_PORT,
        };

        let credentials = Credentials::new(required(KEY_VAR)?, required(TOKEN_VAR)?);

        Ok(Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port,
            credentials,
            allowed_hosts: allowed_hosts(),
        })
    }

    /// Override the listen port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

fn allowed_hosts() -> Vec<String> {
    let Ok(raw) = env::var(ALLOWED_HOSTS_VAR) else {
        return default_allowed_hosts();
    };
    if raw.trim() == "*" {
        return Vec::new();
    }
    let hosts: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|host| !host.is_empty())
        .map(String::from)
        .collect();
    if hosts.is_empty() {
        default_allowed_hosts()
    } else {
        hosts
    }
}

fn required(name: &'static str) -> ConfigResult<String> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::MissingVar { name })
}
