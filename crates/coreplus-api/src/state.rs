//! Application state shared by the composition root and the server.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use coreplus_core::config::AppConfig;
use coreplus_core::configs::{CoreplusSettings, SettingChanged};
use coreplus_hooks::{AppRegistry, HookDirectory};
use coreplus_settings::SettingsRegistry;

use crate::admin::AdminSite;

/// Every long-lived registry of a running server.
///
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Typed settings facade.
    pub settings: Arc<CoreplusSettings>,
    /// Installed apps in installation order.
    pub apps: Arc<AppRegistry>,
    /// Extension-point directory.
    pub hooks: Arc<HookDirectory>,
    /// Setting types editable from the admin.
    pub settings_registry: Arc<SettingsRegistry>,
    /// The admin site.
    pub admin: Arc<AdminSite>,
    /// Publishes setting-changed notifications to the settings facade.
    pub setting_changed: broadcast::Sender<SettingChanged>,
    /// When the state was built.
    pub started_at: DateTime<Utc>,
}
