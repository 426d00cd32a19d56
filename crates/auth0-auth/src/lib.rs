//! Auth0 identity provider client
//!
//! Implements `provider::IdentityProvider` against an Auth0 tenant and adds
//! the hosted-login pieces the session core does not own.
//!
//! Credential flow:
//! 1. Client calls `pkce::generate_verifier()` + `pkce::compute_challenge()`
//! 2. User logs in via `pkce::build_authorization_url()`
//! 3. `Auth0Client::exchange_code()` trades the pasted code for tokens
//! 4. The session manager stores them and calls `fetch_profile` (`/tokeninfo`)
//! 5. On rejection it calls `refresh_credentials` (`/delegation`)

pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod pkce;
pub mod token;

pub use client::Auth0Client;
pub use config::Auth0Config;
pub use constants::*;
pub use error::{Error, Result};
pub use pkce::{build_authorization_url, compute_challenge, generate_state, generate_verifier};
pub use token::TokenResponse;
