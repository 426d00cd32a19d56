//! CLI-specific error types

use thiserror::Error;

/// Errors raised by argument parsing and the interactive login.
///
/// Session outcomes (`session::SessionError`) are reported separately; these
/// cover what happens before the session manager is involved.
#[derive(Error, Debug)]
pub enum Error {
    #[error("usage: {0}")]
    Usage(String),

    #[error("login aborted: {0}")]
    LoginAborted(String),

    #[error("authorization response state does not match the login request")]
    StateMismatch,
}

/// Result alias using CLI Error
pub type Result<T> = std::result::Result<T, Error>;
