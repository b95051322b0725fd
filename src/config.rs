//! Configuration types.

use std::net::SocketAddr;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default GraphQL endpoint of the board provider.
pub const DEFAULT_API_URL: &str = "https://api.monday.com/v2";

/// Remote board connection settings.
#[derive(Debug, Clone)]
pub struct BoardConfig {
    /// GraphQL endpoint receiving mutations and queries.
    pub api_url: String,
    /// Static API token sent in the `Authorization` header.
    pub api_token: SecretString,
    /// Numeric id of the board new items are created on.
    pub board_id: u64,
}

/// HTTP listener settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    /// Socket address to bind, e.g. `0.0.0.0:3000`.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::InvalidValue {
                key: "FORM_RELAY_HOST".to_string(),
                message: e.to_string(),
            })
    }
}

/// Process-wide configuration, built once at startup and read-only afterwards.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub board: BoardConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    /// Build config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// `MONDAY_API_TOKEN` and `MONDAY_BOARD_ID` are required; everything else
    /// falls back to a default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_token = lookup("MONDAY_API_TOKEN")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("MONDAY_API_TOKEN".to_string()))?;

        let board_id_raw = lookup("MONDAY_BOARD_ID")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("MONDAY_BOARD_ID".to_string()))?;
        let board_id: u64 =
            board_id_raw
                .trim()
                .parse()
                .map_err(|e: std::num::ParseIntError| ConfigError::InvalidValue {
                    key: "MONDAY_BOARD_ID".to_string(),
                    message: e.to_string(),
                })?;

        let api_url = lookup("MONDAY_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let defaults = ServerConfig::default();
        let host = lookup("FORM_RELAY_HOST").unwrap_or(defaults.host);
        let port = match lookup("PORT") {
            Some(raw) => {
                raw.trim()
                    .parse::<u16>()
                    .map_err(|e: std::num::ParseIntError| ConfigError::InvalidValue {
                        key: "PORT".to_string(),
                        message: e.to_string(),
                    })?
            }
            None => defaults.port,
        };

        Ok(Self {
            board: BoardConfig {
                api_url,
                api_token: SecretString::from(api_token),
                board_id,
            },
            server: ServerConfig { host, port },
        })
    }
}
