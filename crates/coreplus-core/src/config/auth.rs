//! Upstream authentication configuration.
//!
//! Coreplus does not authenticate requests itself. A fronting proxy
//! authenticates the user and forwards the username in a trusted header;
//! the accounts table below maps usernames to their admin flags and
//! permissions.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Trusted-header authentication settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Header carrying the authenticated username.
    #[serde(default = "default_header")]
    pub remote_user_header: String,
    /// Known accounts keyed by username.
    #[serde(default)]
    pub users: HashMap<String, AccountConfig>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            remote_user_header: default_header(),
            users: HashMap::new(),
        }
    }
}

/// Flags and permissions of one account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
    /// Permission codenames (`app_label.action_model`).
    #[serde(default)]
    pub permissions: Vec<String>,
}

fn default_header() -> String {
    "x-remote-user".to_string()
}

fn default_true() -> bool {
    true
}
