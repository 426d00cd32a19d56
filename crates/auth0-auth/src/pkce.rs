//! PKCE (Proof Key for Code Exchange) per RFC 7636
//!
//! Generates the code verifier and S256 challenge for the hosted login. The
//! verifier stays with the client and is sent during code exchange; the
//! challenge goes into the authorization URL so the provider can match the
//! two halves of the flow.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngExt;
use sha2::{Digest, Sha256};

use crate::config::Auth0Config;
use crate::constants::AUTHORIZE_PATH;

/// Generate a cryptographically random PKCE code verifier.
///
/// 32 random bytes encoded as URL-safe base64 without padding: 43 characters,
/// the minimum length RFC 7636 allows.
pub fn generate_verifier() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// `challenge = BASE64URL(SHA256(verifier))`
pub fn compute_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Opaque CSRF value echoed back by the provider with the authorization code.
pub fn generate_state() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Build the hosted login URL with every required OAuth parameter.
pub fn build_authorization_url(config: &Auth0Config, state: &str, challenge: &str) -> String {
    format!(
        "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&code_challenge={}&code_challenge_method=S256&state={}",
        config.endpoint(AUTHORIZE_PATH),
        urlencoded(&config.client_id),
        urlencoded(&config.redirect_uri),
        urlencoded(&config.scope),
        challenge,
        state,
    )
}

/// Minimal URL encoding for parameter values.
fn urlencoded(s: &str) -> String {
    s.replace('%', "%25")
        .replace(' ', "%20")
        .replace(':', "%3A")
        .replace('/', "%2F")
        .replace('&', "%26")
        .replace('=', "%3D")
        .replace('?', "%3F")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifier_is_url_safe_base64() {
        let verifier = generate_verifier();
        assert_eq!(verifier.len(), 43);
        assert!(
            verifier
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
            "verifier must be URL-safe base64 (no padding): {verifier}"
        );
    }

    #[test]
    fn verifiers_and_states_are_unique() {
        assert_ne!(generate_verifier(), generate_verifier());
        assert_ne!(generate_state(), generate_state());
    }

    #[test]
    fn challenge_matches_known_value() {
        // SHA256("hello") base64url-encoded
        let challenge = compute_challenge("hello");
        assert_eq!(challenge, "LPJNul-wow4m6DsqxbninhsWHlwfp0JecwQzYpOLmCQ");
    }

    #[test]
    fn authorization_url_contains_required_params() {
        let config = Auth0Config::new("tenant.auth0.com", "abc123");
        let challenge = compute_challenge("test-verifier");
        let url = build_authorization_url(&config, "state-xyz", &challenge);

        assert!(url.starts_with("https://tenant.auth0.com/authorize?"));
        assert!(url.contains("client_id=abc123"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("code_challenge_method=S256"));
        assert!(url.contains(&format!("code_challenge={challenge}")));
        assert!(url.contains("state=state-xyz"));
        assert!(url.contains("scope=openid%20profile%20offline_access"));
        assert!(url.contains("redirect_uri=urn%3Aietf%3Awg%3Aoauth%3A2.0%3Aoob"));
    }
}
