//! Error taxonomy surfaced to session callers

use provider::ProviderError;

/// Terminal outcome of a failed session operation.
///
/// Profile-fetch failures on the stored ID token never appear here directly;
/// they are absorbed into a renewal attempt whose outcome is reported instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Nothing persisted: the user has never logged in or has logged out.
    #[error("no ID token stored")]
    NoIdToken,

    /// The ID token was rejected and there is no refresh token to renew it.
    #[error("no refresh token stored")]
    NoRefreshToken,

    /// The provider rejected the refresh, or the profile fetch under a freshly
    /// refreshed token.
    #[error("identity provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The refresh response did not carry a usable ID token.
    #[error("malformed refresh response: {0}")]
    MalformedResponse(String),

    /// The caller's cancellation token fired first.
    #[error("operation cancelled")]
    Cancelled,
}

impl SessionError {
    /// Whether the caller should send the user through the login flow.
    pub fn requires_login(&self) -> bool {
        !matches!(self, SessionError::Cancelled)
    }
}

/// Result alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_is_wrapped_with_context() {
        let err: SessionError = ProviderError::Rejected("(401) revoked".into()).into();
        assert_eq!(
            err.to_string(),
            "identity provider error: token rejected: (401) revoked"
        );
    }

    #[test]
    fn only_cancellation_skips_login() {
        assert!(SessionError::NoIdToken.requires_login());
        assert!(SessionError::NoRefreshToken.requires_login());
        assert!(SessionError::MalformedResponse("x".into()).requires_login());
        assert!(!SessionError::Cancelled.requires_login());
    }
}
