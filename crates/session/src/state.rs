//! Session lifecycle states
//!
//! Transitions:
//! - Unauthenticated → Restoring (retrieve_profile found an ID token)
//! - Restoring → Authenticated (profile fetch succeeded)
//! - Restoring → Refreshing (profile fetch failed for any reason)
//! - Refreshing → Restoring (new ID token persisted, profile re-fetched)
//! - Refreshing → Expired (no refresh token, or the refresh itself failed)
//! - any → Unauthenticated (logout, or retrieve_profile with nothing stored)

use std::fmt;

/// Where the session currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Unauthenticated,
    Restoring,
    Authenticated,
    Refreshing,
    Expired,
}

impl SessionState {
    /// Status label for logging and `sessionctl status`.
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Unauthenticated => "unauthenticated",
            SessionState::Restoring => "restoring",
            SessionState::Authenticated => "authenticated",
            SessionState::Refreshing => "refreshing",
            SessionState::Expired => "expired",
        }
    }

    /// Whether a provider round-trip is underway.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, SessionState::Restoring | SessionState::Refreshing)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
