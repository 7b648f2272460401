//! REST API mounting configuration.

use serde::{Deserialize, Serialize};

/// REST API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Mount prefix of the API, without a leading slash.
    #[serde(default = "default_url_prefix")]
    pub url_prefix: String,
    /// API versions, each assembled independently from its own hooks.
    #[serde(default = "default_versions")]
    pub versions: Vec<ApiVersionConfig>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url_prefix: default_url_prefix(),
            versions: default_versions(),
        }
    }
}

/// The hook-name triple one API version is assembled from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiVersionConfig {
    /// Version name, also the mount segment and route namespace (`"v1"`).
    pub name: String,
    /// Hook whose contributors return viewset registrations.
    pub viewset_hook: String,
    /// Hook whose contributors return raw API view registrations.
    pub view_hook: String,
    /// Hook whose contributors return `(url_path, module)` includes.
    pub urls_hook: String,
}

impl ApiVersionConfig {
    /// Builds the conventional hook names for version `n` (`API_V{n}_*`).
    pub fn numbered(n: u32) -> Self {
        Self {
            name: format!("v{n}"),
            viewset_hook: format!("API_V{n}_VIEWSET_HOOK"),
            view_hook: format!("API_V{n}_VIEW_HOOK"),
            urls_hook: format!("API_V{n}_URL_PATTERNS"),
        }
    }
}

fn default_url_prefix() -> String {
    "api/".to_string()
}

fn default_versions() -> Vec<ApiVersionConfig> {
    vec![ApiVersionConfig::numbered(1), ApiVersionConfig::numbered(2)]
}
