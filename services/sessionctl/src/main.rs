//! sessionctl
//!
//! Command-line front end for the session manager:
//! 1. Loads the tenant configuration
//! 2. Opens the file-backed secret store
//! 3. Builds one `SessionManager` over the Auth0 client
//! 4. Runs a single command and exits non-zero on failure

mod cli;
mod commands;
mod config;
mod error;
mod login;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use auth0_auth::Auth0Client;
use keychain::{FileStore, SecretStore};
use provider::IdentityProvider;
use session::{CancellationToken, SessionManager};
use tokio::io::BufReader;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Invocation, USAGE};
use crate::commands::Context;
use crate::config::{Config, LogFormat};

/// Install the tracing subscriber on stderr; stdout carries command output.
fn init_tracing(format: LogFormat) {
    let json = format == LogFormat::Json;
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(json.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let invocation = match Invocation::parse(&args) {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("{e}\n\n{USAGE}");
            std::process::exit(2);
        }
    };

    let config_path = Config::resolve_path(invocation.config_path.as_deref());
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    init_tracing(config.log.format);
    info!(
        domain = %config.auth0.domain,
        store = %config.store.path.display(),
        "configuration loaded"
    );

    let store = FileStore::open(&config.store.path).with_context(|| {
        format!(
            "failed to open secret store {}",
            config.store.path.display()
        )
    })?;
    let client = Auth0Client::new(
        config.auth0.clone(),
        Duration::from_secs(config.http.timeout_secs),
    )
    .context("failed to build identity provider client")?;

    let session = SessionManager::new(
        Arc::new(store) as Arc<dyn SecretStore>,
        Arc::new(client.clone()) as Arc<dyn IdentityProvider>,
    );

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("interrupt received, cancelling");
            on_interrupt.cancel();
        }
    });

    let ctx = Context {
        session: Arc::new(session),
        client,
        cancel,
    };

    let mut stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    commands::run(invocation.command, &ctx, &mut stdin, &mut stdout).await
}
