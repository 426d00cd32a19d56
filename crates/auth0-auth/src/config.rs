//! Tenant configuration for the Auth0 client

use serde::Deserialize;

use crate::constants::{DEFAULT_REDIRECT_URI, DEFAULT_SCOPE};
use crate::error::{Error, Result};

/// Auth0 tenant settings.
///
/// `domain` is either a bare host (`tenant.auth0.com`, served over https) or a
/// full base URL including the scheme, which lets tests point the client at
/// a local server.
#[derive(Debug, Clone, Deserialize)]
pub struct Auth0Config {
    pub domain: String,
    pub client_id: String,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    #[serde(default = "default_scope")]
    pub scope: String,
}

fn default_redirect_uri() -> String {
    DEFAULT_REDIRECT_URI.to_string()
}

fn default_scope() -> String {
    DEFAULT_SCOPE.to_string()
}

impl Auth0Config {
    pub fn new(domain: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            client_id: client_id.into(),
            redirect_uri: default_redirect_uri(),
            scope: default_scope(),
        }
    }

    /// Base URL all endpoint paths are joined onto, without a trailing slash.
    pub fn base_url(&self) -> String {
        let domain = self.domain.trim_end_matches('/');
        if domain.starts_with("http://") || domain.starts_with("https://") {
            domain.to_string()
        } else {
            format!("https://{domain}")
        }
    }

    /// Full URL for an endpoint path such as `/tokeninfo`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url())
    }

    /// Reject settings that can never produce a working client.
    pub fn validate(&self) -> Result<()> {
        if self.domain.trim().is_empty() {
            return Err(Error::Config("domain must not be empty".into()));
        }
        if self.client_id.trim().is_empty() {
            return Err(Error::Config("client_id must not be empty".into()));
        }
        if self.domain.contains("://")
            && !self.domain.starts_with("http://")
            && !self.domain.starts_with("https://")
        {
            return Err(Error::Config(format!(
                "domain must be a host or an http(s) URL, got: {}",
                self.domain
            )));
        }
        Ok(())
    }
}
