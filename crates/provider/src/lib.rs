//! Identity provider abstraction
//!
//! Defines the `IdentityProvider` trait that decouples session logic from the
//! provider's wire protocol. The session manager depends only on two remote
//! operations:
//! - `fetch_profile` exchanges a valid ID token for the user's public profile
//! - `refresh_credentials` trades a refresh token for a new credential bundle
//!
//! `auth0_auth::Auth0Client` implements the trait over HTTP; tests implement it
//! with scripted fakes.

pub mod profile;

pub use profile::Profile;

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

/// Credential bundle returned by the delegation/refresh operation.
///
/// Every field is optional on the wire. Callers must check that `id_token`
/// is present before trusting the bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Seconds until the ID token expires (delta, not absolute)
    #[serde(default)]
    pub expires_in: Option<u64>,
}

impl Credentials {
    /// The ID token, if present and non-empty.
    pub fn id_token(&self) -> Option<&str> {
        self.id_token.as_deref().filter(|t| !t.trim().is_empty())
    }
}

/// Errors from identity provider operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// Transport failure: DNS, connect, TLS, timeout.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The provider refused the token (401/403): expired, revoked, or invalid.
    #[error("token rejected: {0}")]
    Rejected(String),

    /// Any other non-success status.
    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Map a non-success HTTP status to an error.
    ///
    /// 401 and 403 mean the presented token is no longer accepted; everything
    /// else keeps its status code for diagnostics.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            401 | 403 => ProviderError::Rejected(format!("({status}) {body}")),
            _ => ProviderError::Status { status, body },
        }
    }

    /// Whether the provider explicitly refused the token.
    pub fn is_rejection(&self) -> bool {
        matches!(self, ProviderError::Rejected(_))
    }
}

/// Result alias for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Remote operations the session manager depends on.
///
/// Uses `Pin<Box<dyn Future>>` return types for dyn-compatibility
/// (`Arc<dyn IdentityProvider>`).
pub trait IdentityProvider: Send + Sync {
    /// Identifier for logging (e.g. "auth0")
    fn id(&self) -> &str;

    /// Fetch the profile of the user identified by `id_token`.
    ///
    /// Fails when the token is expired or invalid, and on any transport error.
    fn fetch_profile<'a>(
        &'a self,
        id_token: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Profile>> + Send + 'a>>;

    /// Exchange a refresh token for a new credential bundle.
    fn refresh_credentials<'a>(
        &'a self,
        refresh_token: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Credentials>> + Send + 'a>>;
}
