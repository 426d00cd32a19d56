//! Secret persistence for session tokens
//!
//! The session manager treats the store as opaque key → string persistence.
//! Two implementations ship here:
//! - `MemoryStore`: process-local, used by tests and ephemeral sessions
//! - `FileStore`: JSON file written atomically with 0600 permissions
//!
//! Every operation is synchronous and atomic per key. Overwrites are
//! destructive and immediate; there is no versioning.

pub mod error;
pub mod file;
pub mod memory;

pub use error::{Error, Result};
pub use file::FileStore;
pub use memory::MemoryStore;

/// Key holding the short-lived ID token.
pub const ID_TOKEN: &str = "id_token";

/// Key holding the long-lived refresh token.
pub const REFRESH_TOKEN: &str = "refresh_token";

/// Key holding the API access token issued alongside the ID token.
pub const ACCESS_TOKEN: &str = "access_token";

/// Key-value persistence for secrets, scoped to one application/user.
pub trait SecretStore: Send + Sync {
    /// Read a value. `Ok(None)` when the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a single key. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// Remove every key held by this store.
    fn clear(&self) -> Result<()>;
}
