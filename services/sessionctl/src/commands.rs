//! Subcommand execution
//!
//! Each command talks to the session manager only; output goes to the given
//! writer so tests can capture it. Failures carry a hint telling the user
//! what to do next.

use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use auth0_auth::Auth0Client;
use provider::Profile;
use session::{CancellationToken, SessionError, SessionManager};
use tokio::io::AsyncBufRead;

use crate::cli::Command;

/// Everything a command needs, built once in `main`.
pub struct Context {
    pub session: Arc<SessionManager>,
    pub client: Auth0Client,
    pub cancel: CancellationToken,
}

/// Execute one command.
pub async fn run<R, W>(
    command: Command,
    ctx: &Context,
    input: &mut R,
    out: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    match command {
        Command::Login => crate::login::run(ctx, input, out).await,
        Command::Store {
            id_token,
            refresh_token,
        } => {
            ctx.session.store_tokens(&id_token, refresh_token.as_deref());
            writeln!(out, "tokens stored")?;
            Ok(())
        }
        Command::Profile => {
            let profile = ctx
                .session
                .retrieve_profile_cancellable(&ctx.cancel)
                .await
                .map_err(session_failure)?;
            writeln!(out, "{}", serde_json::to_string_pretty(&profile)?)?;
            Ok(())
        }
        Command::Refresh => {
            let profile = ctx
                .session
                .refresh_token_cancellable(&ctx.cancel)
                .await
                .map_err(session_failure)?;
            writeln!(out, "session renewed for {}", display_name(&profile))?;
            Ok(())
        }
        Command::Status => {
            writeln!(out, "session: {}", presence(ctx.session.has_session()))?;
            writeln!(
                out,
                "renewable: {}",
                if ctx.session.can_renew() { "yes" } else { "no" }
            )?;
            writeln!(
                out,
                "access token: {}",
                presence(ctx.session.access_token().is_some())
            )?;
            Ok(())
        }
        Command::Roles => {
            let profile = ctx
                .session
                .retrieve_profile_cancellable(&ctx.cancel)
                .await
                .map_err(session_failure)?;
            let roles = profile.roles();
            if roles.is_empty() {
                writeln!(out, "(no roles)")?;
            }
            for role in roles {
                writeln!(out, "{role}")?;
            }
            Ok(())
        }
        Command::Logout => {
            ctx.session.logout();
            writeln!(out, "logged out")?;
            Ok(())
        }
    }
}

/// Attach a next-step hint to a session failure.
pub fn session_failure(err: SessionError) -> anyhow::Error {
    let hint = match &err {
        SessionError::NoIdToken => "not logged in; run `sessionctl login`",
        SessionError::NoRefreshToken => {
            "session expired and cannot be renewed; run `sessionctl login`"
        }
        SessionError::MalformedResponse(_) => {
            "identity provider sent an unusable refresh response; session cleared"
        }
        SessionError::Provider(_) => "identity provider refused the session",
        SessionError::Cancelled => "interrupted",
    };
    anyhow::Error::new(err).context(hint)
}

/// Best human-readable name for a profile.
pub fn display_name(profile: &Profile) -> &str {
    if !profile.name.is_empty() {
        &profile.name
    } else if let Some(nickname) = profile.nickname.as_deref() {
        nickname
    } else {
        &profile.user_id
    }
}

fn presence(present: bool) -> &'static str {
    if present { "present" } else { "absent" }
}
