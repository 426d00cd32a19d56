//! Auth0 endpoint paths and protocol constants
//!
//! Tenant-specific values (domain, client ID) come from `Auth0Config`; these
//! are the fixed parts of the protocol shared by every tenant.

/// Hosted login page (authorization code + PKCE)
pub const AUTHORIZE_PATH: &str = "/authorize";

/// Token endpoint for authorization code exchange
pub const TOKEN_PATH: &str = "/oauth/token";

/// Delegation endpoint: trades a refresh token for a new ID token
pub const DELEGATION_PATH: &str = "/delegation";

/// Token info endpoint: returns the profile behind an ID token
pub const TOKENINFO_PATH: &str = "/tokeninfo";

/// Grant type used by the delegation endpoint for refresh-token renewal.
pub const DELEGATION_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Default OAuth scopes. `offline_access` is what makes the provider issue
/// a refresh token at login; without it sessions cannot be renewed silently.
pub const DEFAULT_SCOPE: &str = "openid profile offline_access";

/// Scope requested on delegation (the new ID token only needs `openid`).
pub const DELEGATION_SCOPE: &str = "openid";

/// Redirect URI used by native apps that paste the code back by hand.
pub const DEFAULT_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";
