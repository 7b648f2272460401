//! Admin site configuration.

use serde::{Deserialize, Serialize};

/// Admin site mounting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Mount prefix of the admin site, without a leading slash.
    #[serde(default = "default_url_prefix")]
    pub url_prefix: String,
    /// Whether per-namespace app index pages are served.
    #[serde(default = "default_true")]
    pub enable_app_index: bool,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            url_prefix: default_url_prefix(),
            enable_app_index: true,
        }
    }
}

fn default_url_prefix() -> String {
    "admin/".to_string()
}

fn default_true() -> bool {
    true
}
