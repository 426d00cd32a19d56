//! Auth0 token endpoints
//!
//! Three interactions, each a single POST:
//! 1. Authorization code exchange at `/oauth/token` (login completion)
//! 2. Refresh-token delegation at `/delegation` (silent renewal)
//! 3. Profile lookup at `/tokeninfo` (ID token → user attributes)
//!
//! Delegation and token info return `provider::ProviderError` because they
//! back the `IdentityProvider` trait; code exchange happens outside the
//! session core and uses the crate's own `Error`.

use provider::{Credentials, Profile, ProviderError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Auth0Config;
use crate::constants::{
    DELEGATION_GRANT_TYPE, DELEGATION_PATH, DELEGATION_SCOPE, TOKEN_PATH, TOKENINFO_PATH,
};
use crate::error::{Error, Result};

/// Response from the token endpoint after a code exchange.
///
/// `refresh_token` is only issued when `offline_access` was requested.
#[derive(Debug, Deserialize, Serialize)]
pub struct TokenResponse {
    pub id_token: String,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Seconds until the tokens expire (delta, not absolute)
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Exchange an authorization code for tokens.
///
/// The user has logged in on the hosted page and pasted back the code; the
/// PKCE verifier proves this client started the flow.
pub async fn exchange_code(
    client: &reqwest::Client,
    config: &Auth0Config,
    code: &str,
    verifier: &str,
) -> Result<TokenResponse> {
    let response = client
        .post(config.endpoint(TOKEN_PATH))
        .form(&[
            ("grant_type", "authorization_code"),
            ("client_id", config.client_id.as_str()),
            ("code", code),
            ("code_verifier", verifier),
            ("redirect_uri", config.redirect_uri.as_str()),
        ])
        .send()
        .await
        .map_err(|e| Error::Http(format!("token exchange request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));
        return Err(Error::TokenExchange(format!(
            "token endpoint returned {status}: {body}"
        )));
    }

    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| Error::TokenExchange(format!("invalid token response: {e}")))
}

/// Trade a refresh token for a new credential bundle via delegation.
///
/// The bundle is returned as-is; whether it carries an ID token is for the
/// caller to check.
pub async fn delegate(
    client: &reqwest::Client,
    config: &Auth0Config,
    refresh_token: &str,
) -> provider::Result<Credentials> {
    let response = client
        .post(config.endpoint(DELEGATION_PATH))
        .form(&[
            ("client_id", config.client_id.as_str()),
            ("grant_type", DELEGATION_GRANT_TYPE),
            ("refresh_token", refresh_token),
            ("scope", DELEGATION_SCOPE),
            ("api_type", "app"),
        ])
        .send()
        .await
        .map_err(|e| ProviderError::Http(format!("delegation request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));
        debug!(status = status.as_u16(), "delegation refused");
        return Err(ProviderError::from_status(status.as_u16(), body));
    }

    response
        .json::<Credentials>()
        .await
        .map_err(|e| ProviderError::InvalidResponse(format!("invalid delegation response: {e}")))
}

#[derive(Serialize)]
struct TokenInfoRequest<'a> {
    id_token: &'a str,
}

/// Fetch the profile behind an ID token.
pub async fn token_info(
    client: &reqwest::Client,
    config: &Auth0Config,
    id_token: &str,
) -> provider::Result<Profile> {
    let response = client
        .post(config.endpoint(TOKENINFO_PATH))
        .json(&TokenInfoRequest { id_token })
        .send()
        .await
        .map_err(|e| ProviderError::Http(format!("tokeninfo request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));
        debug!(status = status.as_u16(), "tokeninfo refused");
        return Err(ProviderError::from_status(status.as_u16(), body));
    }

    response
        .json::<Profile>()
        .await
        .map_err(|e| ProviderError::InvalidResponse(format!("invalid tokeninfo response: {e}")))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use std::collections::HashMap;
    use tokio::net::TcpListener;

    /// Start a fake Auth0 tenant on a random local port.
    ///
    /// - `/tokeninfo` accepts only `id_valid`
    /// - `/delegation` accepts `rt_good`, returns a bundle without an ID token
    ///   for `rt_empty`, and rejects everything else with 401
    /// - `/oauth/token` accepts code `code_ok` with verifier `verifier_ok`
    pub(crate) async fn start_fake_tenant() -> (Auth0Config, tokio::task::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let config = Auth0Config::new(format!("http://{addr}"), "test-client");

        let handle = tokio::spawn(async move {
            let app = axum::Router::new()
                .route(
                    "/tokeninfo",
                    axum::routing::post(|axum::Json(body): axum::Json<serde_json::Value>| async move {
                        if body["id_token"] == "id_valid" {
                            axum::Json(serde_json::json!({
                                "user_id": "auth0|42",
                                "name": "Jane Doe",
                                "picture": "https://cdn.example.com/jane.png",
                                "app_metadata": {"roles": ["admin"]}
                            }))
                            .into_response()
                        } else {
                            (StatusCode::UNAUTHORIZED, "invalid token").into_response()
                        }
                    }),
                )
                .route(
                    "/delegation",
                    axum::routing::post(
                        |axum::Form(form): axum::Form<HashMap<String, String>>| async move {
                            if form.get("grant_type").map(String::as_str) != Some(DELEGATION_GRANT_TYPE)
                                || form.get("client_id").map(String::as_str) != Some("test-client")
                            {
                                return (StatusCode::BAD_REQUEST, "bad request").into_response();
                            }
                            match form.get("refresh_token").map(String::as_str) {
                                Some("rt_good") => axum::Json(serde_json::json!({
                                    "id_token": "id_refreshed",
                                    "token_type": "Bearer",
                                    "expires_in": 36000
                                }))
                                .into_response(),
                                Some("rt_empty") => {
                                    axum::Json(serde_json::json!({"token_type": "Bearer"}))
                                        .into_response()
                                }
                                _ => (StatusCode::UNAUTHORIZED, "invalid refresh token")
                                    .into_response(),
                            }
                        },
                    ),
                )
                .route(
                    "/oauth/token",
                    axum::routing::post(
                        |axum::Form(form): axum::Form<HashMap<String, String>>| async move {
                            let ok = form.get("grant_type").map(String::as_str)
                                == Some("authorization_code")
                                && form.get("code").map(String::as_str) == Some("code_ok")
                                && form.get("code_verifier").map(String::as_str)
                                    == Some("verifier_ok");
                            if ok {
                                axum::Json(serde_json::json!({
                                    "id_token": "id_valid",
                                    "access_token": "at_1",
                                    "refresh_token": "rt_good",
                                    "expires_in": 86400
                                }))
                                .into_response()
                            } else {
                                (StatusCode::FORBIDDEN, "invalid grant").into_response()
                            }
                        },
                    ),
                );
            axum::serve(listener, app).await.unwrap();
        });

        (config, handle)
    }

    #[test]
    fn token_response_tolerates_missing_refresh_token() {
        let json = r#"{"id_token":"id_abc","access_token":"at_abc","expires_in":3600}"#;
        let token: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(token.id_token, "id_abc");
        assert!(token.refresh_token.is_none());
        assert_eq!(token.expires_in, Some(3600));
    }

    #[tokio::test]
    async fn token_info_returns_profile_for_valid_token() {
        let (config, _server) = start_fake_tenant().await;
        let client = reqwest::Client::new();

        let profile = token_info(&client, &config, "id_valid").await.unwrap();
        assert_eq!(profile.user_id, "auth0|42");
        assert!(profile.has_role("admin"));
    }

    #[tokio::test]
    async fn token_info_rejects_expired_token() {
        let (config, _server) = start_fake_tenant().await;
        let client = reqwest::Client::new();

        let err = token_info(&client, &config, "id_expired").await.unwrap_err();
        assert!(err.is_rejection(), "got: {err:?}");
    }

    #[tokio::test]
    async fn delegate_returns_new_id_token() {
        let (config, _server) = start_fake_tenant().await;
        let client = reqwest::Client::new();

        let creds = delegate(&client, &config, "rt_good").await.unwrap();
        assert_eq!(creds.id_token(), Some("id_refreshed"));
    }

    #[tokio::test]
    async fn delegate_passes_through_bundle_without_id_token() {
        let (config, _server) = start_fake_tenant().await;
        let client = reqwest::Client::new();

        let creds = delegate(&client, &config, "rt_empty").await.unwrap();
        assert!(creds.id_token().is_none());
    }

    #[tokio::test]
    async fn delegate_rejects_revoked_refresh_token() {
        let (config, _server) = start_fake_tenant().await;
        let client = reqwest::Client::new();

        let err = delegate(&client, &config, "rt_revoked").await.unwrap_err();
        assert!(err.is_rejection(), "got: {err:?}");
    }

    #[tokio::test]
    async fn exchange_code_returns_token_pair() {
        let (config, _server) = start_fake_tenant().await;
        let client = reqwest::Client::new();

        let tokens = exchange_code(&client, &config, "code_ok", "verifier_ok")
            .await
            .unwrap();
        assert_eq!(tokens.id_token, "id_valid");
        assert_eq!(tokens.refresh_token.as_deref(), Some("rt_good"));
    }

    #[tokio::test]
    async fn exchange_code_rejects_invalid_code() {
        let (config, _server) = start_fake_tenant().await;
        let client = reqwest::Client::new();

        let result = exchange_code(&client, &config, "bogus", "verifier_ok").await;
        assert!(matches!(result, Err(Error::TokenExchange(_))));
    }

    #[tokio::test]
    async fn unreachable_tenant_is_http_error() {
        let config = Auth0Config::new("http://127.0.0.1:1", "test-client");
        let client = reqwest::Client::new();

        let err = token_info(&client, &config, "id_valid").await.unwrap_err();
        assert!(matches!(err, ProviderError::Http(_)), "got: {err:?}");
    }
}
