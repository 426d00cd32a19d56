//! Session and credential lifecycle manager
//!
//! Owns the decision logic around three pieces of state: the long-lived
//! refresh token, the short-lived ID token derived from it, and the user
//! profile fetched with the ID token. Tokens live only in a
//! `keychain::SecretStore`; the profile lives only in memory.
//!
//! Lifecycle of one `retrieve_profile` call:
//! 1. No ID token stored → `NoIdToken`, no network
//! 2. ID token accepted by the provider → profile cached, `Authenticated`
//! 3. ID token refused → one renewal with the refresh token
//! 4. No refresh token → `NoRefreshToken`, nothing written
//! 5. Refresh refused or malformed → full logout, error returned
//! 6. Refresh accepted → new ID token stored, profile fetched once more

pub mod error;
pub mod manager;
pub mod metrics;
pub mod state;

pub use error::{Result, SessionError};
pub use manager::SessionManager;
pub use state::SessionState;
pub use tokio_util::sync::CancellationToken;
