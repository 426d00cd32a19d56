//! Error types for Auth0 client operations

use provider::ProviderError;

/// Errors from Auth0 operations outside the `IdentityProvider` contract
/// (configuration, code exchange).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Result alias for auth operations.
pub type Result<T> = std::result::Result<T, Error>;
