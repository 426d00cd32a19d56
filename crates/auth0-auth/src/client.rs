//! `IdentityProvider` implementation backed by an Auth0 tenant

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use provider::{Credentials, IdentityProvider, Profile};
use tracing::debug;

use crate::config::Auth0Config;
use crate::error::Result;
use crate::token::{self, TokenResponse};

/// HTTP client for one Auth0 tenant.
///
/// Cheap to clone; `reqwest::Client` shares its connection pool.
#[derive(Debug, Clone)]
pub struct Auth0Client {
    http: reqwest::Client,
    config: Auth0Config,
}

impl Auth0Client {
    /// Build a client with its own connection pool and a request timeout.
    pub fn new(config: Auth0Config, timeout: Duration) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| crate::Error::Http(format!("building HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    /// Build a client around an existing `reqwest::Client`.
    pub fn with_http_client(config: Auth0Config, http: reqwest::Client) -> Result<Self> {
        config.validate()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &Auth0Config {
        &self.config
    }

    /// Complete a hosted login by exchanging the authorization code.
    pub async fn exchange_code(&self, code: &str, verifier: &str) -> Result<TokenResponse> {
        debug!(domain = %self.config.domain, "exchanging authorization code");
        token::exchange_code(&self.http, &self.config, code, verifier).await
    }
}

impl IdentityProvider for Auth0Client {
    fn id(&self) -> &str {
        "auth0"
    }

    fn fetch_profile<'a>(
        &'a self,
        id_token: &'a str,
    ) -> Pin<Box<dyn Future<Output = provider::Result<Profile>> + Send + 'a>> {
        Box::pin(async move {
            debug!(domain = %self.config.domain, "fetching profile");
            token::token_info(&self.http, &self.config, id_token).await
        })
    }

    fn refresh_credentials<'a>(
        &'a self,
        refresh_token: &'a str,
    ) -> Pin<Box<dyn Future<Output = provider::Result<Credentials>> + Send + 'a>> {
        Box::pin(async move {
            debug!(domain = %self.config.domain, "requesting delegation");
            token::delegate(&self.http, &self.config, refresh_token).await
        })
    }
}
