//! Interactive hosted login (authorization code + PKCE)

use std::io::Write;

use anyhow::{Context as _, Result};
use auth0_auth::{build_authorization_url, compute_challenge, generate_state, generate_verifier};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};

use crate::commands::{Context, display_name, session_failure};
use crate::error::Error;

/// Extract the authorization code from what the user pasted.
///
/// Accepts the bare code or the full redirect URL / query string. When a
/// `state` parameter is present it must match the one sent in the login URL.
pub fn parse_authorization_response(
    input: &str,
    expected_state: &str,
) -> crate::error::Result<String> {
    let input = input.trim();
    if input.is_empty() {
        return Err(Error::LoginAborted("no authorization code entered".into()));
    }

    if !input.contains("code=") {
        return Ok(input.to_string());
    }

    let query = input.split_once('?').map_or(input, |(_, q)| q);
    let query = query.split('#').next().unwrap_or(query);
    let mut code = None;
    let mut state = None;
    for pair in query.split('&') {
        match pair.split_once('=') {
            Some(("code", value)) => code = Some(value),
            Some(("state", value)) => state = Some(value),
            _ => {}
        }
    }

    if let Some(state) = state
        && state != expected_state
    {
        return Err(Error::StateMismatch);
    }

    code.filter(|c| !c.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| Error::LoginAborted("authorization response has no code".into()))
}

/// Run the hosted login: print the URL, read the code, exchange it, store
/// the tokens and fetch the profile.
pub async fn run<R, W>(ctx: &Context, input: &mut R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let verifier = generate_verifier();
    let challenge = compute_challenge(&verifier);
    let state = generate_state();
    let url = build_authorization_url(ctx.client.config(), &state, &challenge);

    writeln!(out, "Open this URL to log in:\n\n  {url}\n\nPaste the authorization code:")?;
    out.flush()?;

    let mut line = String::new();
    tokio::select! {
        _ = ctx.cancel.cancelled() => {
            return Err(Error::LoginAborted("cancelled".into()).into());
        }
        read = input.read_line(&mut line) => {
            read.context("reading authorization code")?;
        }
    }

    let code = parse_authorization_response(&line, &state)?;
    let tokens = ctx
        .client
        .exchange_code(&code, &verifier)
        .await
        .context("exchanging authorization code")?;

    ctx.session
        .store_tokens(&tokens.id_token, tokens.refresh_token.as_deref());
    if let Some(access_token) = tokens.access_token.as_deref() {
        ctx.session.store_access_token(access_token);
    }
    if tokens.refresh_token.is_none() {
        warn!("no refresh token issued; the session cannot be renewed silently");
    }
    info!("login completed, fetching profile");

    let profile = ctx
        .session
        .retrieve_profile_cancellable(&ctx.cancel)
        .await
        .map_err(session_failure)?;
    writeln!(out, "Welcome, {}", display_name(&profile))?;
    Ok(())
}
