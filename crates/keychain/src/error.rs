//! Error types for secret store operations

/// Errors from secret store operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("secret file parse error: {0}")]
    Parse(String),
}

/// Result alias for store operations.
pub type Result<T> = std::result::Result<T, Error>;
