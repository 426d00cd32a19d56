//! Session manager: token lifecycle state machine and profile cache
//!
//! The secret store is the single source of truth for tokens. The manager
//! reads the ID token at call time, asks the provider for the profile, and on
//! any failure makes exactly one renewal attempt with the stored refresh
//! token before giving up. A refresh the provider refuses tears the whole
//! session down.
//!
//! Refreshes are serialized behind `refresh_gate`. A caller that waited on
//! the gate first checks whether the ID token it saw rejected has already
//! been replaced; if so it reuses the new token instead of spending the
//! refresh token again.

use std::sync::Arc;

use common::Secret;
use keychain::{ACCESS_TOKEN, ID_TOKEN, REFRESH_TOKEN, SecretStore};
use parking_lot::RwLock;
use provider::{IdentityProvider, Profile};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{Result, SessionError};
use crate::metrics;
use crate::state::SessionState;

/// One logical user session.
///
/// Construct one per account at the composition root and share it by `Arc`.
pub struct SessionManager {
    store: Arc<dyn SecretStore>,
    provider: Arc<dyn IdentityProvider>,
    profile: RwLock<Option<Profile>>,
    state: RwLock<SessionState>,
    refresh_gate: Mutex<()>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SecretStore>, provider: Arc<dyn IdentityProvider>) -> Self {
        info!(provider = provider.id(), "session manager initialized");
        Self {
            store,
            provider,
            profile: RwLock::new(None),
            state: RwLock::new(SessionState::Unauthenticated),
            refresh_gate: Mutex::new(()),
        }
    }

    /// Persist a credential pair.
    ///
    /// The ID token is always written; the refresh token only when supplied,
    /// so an existing one survives an ID-token-only update. Any cached profile
    /// belongs to the previous token and is dropped.
    pub fn store_tokens(&self, id_token: &str, refresh_token: Option<&str>) {
        self.write_secret(ID_TOKEN, id_token);
        if let Some(refresh_token) = refresh_token {
            self.write_secret(REFRESH_TOKEN, refresh_token);
        }
        self.invalidate_profile();
        debug!(
            with_refresh_token = refresh_token.is_some(),
            "stored tokens"
        );
    }

    /// Persist the API access token issued alongside the ID token.
    pub fn store_access_token(&self, access_token: &str) {
        self.write_secret(ACCESS_TOKEN, access_token);
    }

    /// The stored API access token, if any.
    pub fn access_token(&self) -> Option<String> {
        self.read_secret(ACCESS_TOKEN)
    }

    /// Whether an ID token is persisted (the session may still be expired).
    pub fn has_session(&self) -> bool {
        self.read_secret(ID_TOKEN).is_some()
    }

    /// Whether a refresh token is persisted.
    pub fn can_renew(&self) -> bool {
        self.read_secret(REFRESH_TOKEN).is_some()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        *self.state.read()
    }

    /// The cached profile from the last successful fetch.
    pub fn profile(&self) -> Option<Profile> {
        self.profile.read().clone()
    }

    /// Whether the cached profile grants `role`. False without a profile.
    pub fn has_role(&self, role: &str) -> bool {
        self.profile
            .read()
            .as_ref()
            .is_some_and(|profile| profile.has_role(role))
    }

    /// Restore or validate the session and return the user's profile.
    ///
    /// Fails with `NoIdToken` without touching the network when nothing is
    /// stored. Any failure of the profile fetch is absorbed into one silent
    /// renewal whose outcome becomes the result.
    pub async fn retrieve_profile(&self) -> Result<Profile> {
        let Some(id_token) = self.read_secret(ID_TOKEN) else {
            debug!("no ID token stored");
            self.set_state(SessionState::Unauthenticated);
            return Err(SessionError::NoIdToken);
        };

        self.set_state(SessionState::Restoring);
        match self.provider.fetch_profile(&id_token).await {
            Ok(profile) => {
                metrics::record_profile_fetch("ok");
                Ok(self.accept_profile(profile))
            }
            Err(e) => {
                metrics::record_profile_fetch("rejected");
                info!(error = %e, "profile fetch failed, attempting silent renewal");
                self.invalidate_profile();
                self.renew(Some(id_token)).await
            }
        }
    }

    /// Renew the ID token with the stored refresh token, then fetch the
    /// profile under the new token.
    ///
    /// Normally reached through `retrieve_profile`; callable directly to force
    /// a renewal.
    pub async fn refresh_token(&self) -> Result<Profile> {
        self.renew(None).await
    }

    /// `retrieve_profile` that resolves with `Cancelled` once `cancel` fires.
    pub async fn retrieve_profile_cancellable(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Profile> {
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SessionError::Cancelled),
            result = self.retrieve_profile() => result,
        };
        if matches!(result, Err(SessionError::Cancelled)) {
            self.settle_after_cancel();
        }
        result
    }

    /// `refresh_token` that resolves with `Cancelled` once `cancel` fires.
    pub async fn refresh_token_cancellable(&self, cancel: &CancellationToken) -> Result<Profile> {
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SessionError::Cancelled),
            result = self.refresh_token() => result,
        };
        if matches!(result, Err(SessionError::Cancelled)) {
            self.settle_after_cancel();
        }
        result
    }

    /// Run `retrieve_profile` on a spawned task and hand the outcome to
    /// `callback`.
    ///
    /// The callback always runs exactly once, on the runtime rather than on
    /// the caller's stack. Must be called from within a tokio runtime.
    pub fn retrieve_profile_with<F>(
        self: &Arc<Self>,
        cancel: CancellationToken,
        callback: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce(Result<Profile>) + Send + 'static,
    {
        let session = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = session.retrieve_profile_cancellable(&cancel).await;
            callback(outcome);
        })
    }

    /// Callback flavour of `refresh_token`, with the same guarantees as
    /// `retrieve_profile_with`.
    pub fn refresh_token_with<F>(
        self: &Arc<Self>,
        cancel: CancellationToken,
        callback: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce(Result<Profile>) + Send + 'static,
    {
        let session = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = session.refresh_token_cancellable(&cancel).await;
            callback(outcome);
        })
    }

    /// Wipe every stored secret and the cached profile. Idempotent.
    pub fn logout(&self) {
        self.wipe();
        self.set_state(SessionState::Unauthenticated);
        metrics::record_logout("explicit");
        info!("logged out");
    }

    /// Refresh protocol. `rejected` is the ID token the provider just refused,
    /// or `None` for an explicit refresh.
    async fn renew(&self, rejected: Option<String>) -> Result<Profile> {
        let _gate = self.refresh_gate.lock().await;

        if let Some(rejected) = rejected.as_deref()
            && let Some(current) = self.read_secret(ID_TOKEN)
            && current != rejected
        {
            debug!("ID token already replaced by a concurrent refresh");
            metrics::record_refresh("coalesced");
            return self.fetch_renewed_profile(&current).await;
        }

        self.set_state(SessionState::Refreshing);
        let Some(refresh_token) = self
            .read_secret(REFRESH_TOKEN)
            .map(Secret::from)
            .filter(|token| !token.is_blank())
        else {
            info!("no refresh token stored, session cannot be renewed");
            metrics::record_refresh("no_refresh_token");
            self.set_state(SessionState::Expired);
            return Err(SessionError::NoRefreshToken);
        };

        let outcome = self
            .provider
            .refresh_credentials(refresh_token.expose())
            .await;
        drop(refresh_token);

        let credentials = match outcome {
            Ok(credentials) => credentials,
            Err(e) => {
                warn!(error = %e, "refresh rejected, tearing down session");
                metrics::record_refresh("provider_error");
                self.expire();
                return Err(SessionError::Provider(e));
            }
        };

        let Some(id_token) = credentials.id_token().map(str::to_owned) else {
            warn!("refresh response carried no ID token, tearing down session");
            metrics::record_refresh("malformed");
            self.expire();
            return Err(SessionError::MalformedResponse(
                "refresh response has no id_token".into(),
            ));
        };

        // Refresh tokens are not rotated by delegation.
        self.store_tokens(&id_token, None);
        metrics::record_refresh("ok");
        info!("ID token renewed");

        self.fetch_renewed_profile(&id_token).await
    }

    /// Profile fetch under a freshly renewed token. A failure here is final:
    /// renewing again would loop against a provider that keeps refusing.
    async fn fetch_renewed_profile(&self, id_token: &str) -> Result<Profile> {
        self.set_state(SessionState::Restoring);
        match self.provider.fetch_profile(id_token).await {
            Ok(profile) => {
                metrics::record_profile_fetch("ok");
                Ok(self.accept_profile(profile))
            }
            Err(e) => {
                metrics::record_profile_fetch("rejected");
                warn!(error = %e, "profile fetch failed with renewed token");
                self.set_state(SessionState::Expired);
                Err(SessionError::Provider(e))
            }
        }
    }

    fn accept_profile(&self, profile: Profile) -> Profile {
        *self.profile.write() = Some(profile.clone());
        self.set_state(SessionState::Authenticated);
        debug!(user_id = %profile.user_id, "profile cached");
        profile
    }

    fn invalidate_profile(&self) {
        self.profile.write().take();
    }

    /// Forced logout after an untrustworthy refresh.
    fn expire(&self) {
        self.wipe();
        self.set_state(SessionState::Expired);
        metrics::record_logout("refresh_failed");
    }

    fn wipe(&self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "failed to clear secret store");
        }
        self.invalidate_profile();
    }

    /// A dropped operation may leave an in-flight state behind.
    fn settle_after_cancel(&self) {
        let mut state = self.state.write();
        if state.is_in_flight() {
            *state = if self.profile.read().is_some() {
                SessionState::Authenticated
            } else {
                SessionState::Unauthenticated
            };
        }
        debug!(state = %*state, "operation cancelled");
    }

    fn set_state(&self, next: SessionState) {
        let mut state = self.state.write();
        if *state != next {
            debug!(from = %*state, to = %next, "session state transition");
            *state = next;
        }
    }

    fn read_secret(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                warn!(key, error = %e, "secret store read failed, treating as absent");
                None
            }
        }
    }

    fn write_secret(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            warn!(key, error = %e, "secret store write failed");
        }
    }
}
