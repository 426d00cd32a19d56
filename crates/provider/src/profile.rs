//! User profile returned by the identity provider

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Public attributes of the authenticated user.
///
/// Known fields are typed; everything else the provider sends (`app_metadata`,
/// `user_metadata`, `identities`, ...) is kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(alias = "sub")]
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Avatar URL
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Profile {
    /// Roles granted to the user, read from `app_metadata.roles`.
    ///
    /// Accepts either an array of strings or a single string. Returns an empty
    /// list when the attribute is missing or has any other shape.
    pub fn roles(&self) -> Vec<String> {
        let Some(roles) = self
            .extra
            .get("app_metadata")
            .and_then(|meta| meta.get("roles"))
        else {
            return Vec::new();
        };

        match roles {
            serde_json::Value::String(role) => vec![role.clone()],
            serde_json::Value::Array(items) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_owned))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Whether `role` is among the user's roles.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles().iter().any(|r| r == role)
    }
}
