//! Session lifecycle counters
//!
//! - `session_profile_fetch_total` (counter): label `outcome`
//! - `session_refresh_total` (counter): label `outcome`
//! - `session_logout_total` (counter): label `reason`
//!
//! Without an installed recorder every call is a no-op.

/// Record a profile fetch with `outcome` of "ok" or "rejected".
pub fn record_profile_fetch(outcome: &'static str) {
    metrics::counter!("session_profile_fetch_total", "outcome" => outcome).increment(1);
}

/// Record a refresh attempt with `outcome` of "ok", "no_refresh_token",
/// "provider_error", "malformed" or "coalesced".
pub fn record_refresh(outcome: &'static str) {
    metrics::counter!("session_refresh_total", "outcome" => outcome).increment(1);
}

/// Record a session wipe with `reason` of "explicit" or "refresh_failed".
pub fn record_logout(reason: &'static str) {
    metrics::counter!("session_logout_total", "reason" => reason).increment(1);
}
