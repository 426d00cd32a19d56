//! Shared types for the session toolkit
//!
//! `Secret` wraps token material so it never reaches logs, and `Error` covers
//! configuration loading for the binaries.

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;
