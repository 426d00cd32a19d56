//! Configuration types and loading
//!
//! Config precedence: CLI `--config` > `CONFIG_PATH` env var > `sessionctl.toml`.
//! `AUTH0_DOMAIN` and `AUTH0_CLIENT_ID` override the file so one config can
//! be pointed at different tenants.

use auth0_auth::Auth0Config;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct Config {
    pub auth0: Auth0Config,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Where tokens are persisted
#[derive(Debug, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

/// Identity provider HTTP settings
#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
        }
    }
}

/// Log output format on stderr
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Default, Deserialize)]
pub struct LogConfig {
    #[serde(default)]
    pub format: LogFormat,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("sessionctl-secrets.json")
}

fn default_timeout() -> u64 {
    30
}

impl Config {
    /// Load configuration from a TOML file, then overlay environment variables.
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;

        if let Ok(domain) = std::env::var("AUTH0_DOMAIN") {
            config.auth0.domain = domain;
        }
        if let Ok(client_id) = std::env::var("AUTH0_CLIENT_ID") {
            config.auth0.client_id = client_id;
        }

        config
            .auth0
            .validate()
            .map_err(|e| common::Error::Config(e.to_string()))?;

        if config.http.timeout_secs == 0 {
            return Err(common::Error::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if config.store.path.as_os_str().is_empty() {
            return Err(common::Error::Config("store path must not be empty".into()));
        }

        Ok(config)
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("sessionctl.toml")
    }
}
