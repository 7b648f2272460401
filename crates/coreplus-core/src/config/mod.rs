//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod admin;
pub mod api;
pub mod app;
pub mod auth;
pub mod hooks;
pub mod logging;

use serde::{Deserialize, Serialize};

use self::admin::AdminConfig;
use self::api::ApiConfig;
use self::app::ServerConfig;
use self::auth::AuthConfig;
use self::hooks::HooksConfig;
use self::logging::LoggingConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Installed applications and hook discovery.
    #[serde(default)]
    pub hooks: HooksConfig,
    /// REST API mounting.
    #[serde(default)]
    pub api: ApiConfig,
    /// Admin site mounting.
    #[serde(default)]
    pub admin: AdminConfig,
    /// Trusted-header authentication.
    #[serde(default)]
    pub auth: AuthConfig,
    /// User overrides for the settings facade.
    #[serde(default)]
    pub coreplus: serde_json::Map<String, serde_json::Value>,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `COREPLUS__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = ::config::Config::builder()
            .add_source(::config::File::with_name("config/default").required(false))
            .add_source(::config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                ::config::Environment::with_prefix("COREPLUS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_deserialize_from_empty_table() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.api.versions.len(), 2);
        assert_eq!(config.api.versions[0].viewset_hook, "API_V1_VIEWSET_HOOK");
        assert_eq!(config.admin.url_prefix, "admin/");
        assert!(config.hooks.installed_apps.is_empty());
        assert!(config.coreplus.is_empty());
        assert_eq!(config.auth.remote_user_header, "x-remote-user");
    }

    #[test]
    fn test_partial_overrides_keep_other_defaults() {
        let config: AppConfig = serde_json::from_value(serde_json::json!({
            "server": { "port": 9001 },
            "coreplus": { "site_title": "Ops" },
            "auth": { "users": { "ada": { "is_staff": true } } }
        }))
        .unwrap();
        assert_eq!(config.server.port, 9001);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.coreplus["site_title"], "Ops");
        let ada = &config.auth.users["ada"];
        assert!(ada.is_active && ada.is_staff && !ada.is_superuser);
    }
}
