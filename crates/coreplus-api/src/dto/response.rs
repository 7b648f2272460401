//! Response DTOs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use coreplus_core::types::ModelMeta;
use coreplus_hooks::{HookDescription, SettingsMenuItem};

use crate::admin::site::AppEntry;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: i64,
}

/// Titles shared by every admin page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteContext {
    pub site_title: String,
    pub site_header: String,
    pub is_app_index_enabled: bool,
}

/// Admin index page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminIndexResponse {
    pub title: String,
    #[serde(flatten)]
    pub site: SiteContext,
    pub app_list: Vec<AppEntry>,
    pub settings_menu: Vec<SettingsMenuItem>,
}

/// Per-namespace admin index page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppIndexResponse {
    pub title: String,
    #[serde(flatten)]
    pub site: SiteContext,
    pub app_label: String,
    pub app_list: Vec<AppEntry>,
}

/// Hook registry introspection page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookRegistryResponse {
    pub title: String,
    #[serde(flatten)]
    pub site: SiteContext,
    pub hook_list: Vec<HookDescription>,
}

/// Settings index page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsIndexResponse {
    pub title: String,
    pub items: Vec<SettingsMenuItem>,
}

/// Settings edit page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingEditResponse {
    pub title: String,
    pub setting_type_name: String,
    pub model: ModelMeta,
    pub values: Map<String, Value>,
}
