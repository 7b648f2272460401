//! The admin site and its app index builder.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use coreplus_core::config::admin::AdminConfig;
use coreplus_core::configs::CoreplusSettings;
use coreplus_core::error::AppError;
use coreplus_core::result::AppResult;
use coreplus_core::routing::RouteTable;
use coreplus_core::types::model::capfirst;
use coreplus_core::types::{ModelMeta, Viewer};
use coreplus_hooks::{AppRegistry, HookDispatcher};
use coreplus_settings::SettingsRegistry;

use crate::dto::response::{AppIndexResponse, SiteContext};

const DEFAULT_APP_ICON: &str = "apps";
const DEFAULT_MODEL_ICON: &str = "text-box-outline";
const DEFAULT_USER_ICON: &str = "account-circle-outline";

/// What a viewer may do with a model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelPerms {
    pub add: bool,
    pub change: bool,
    pub delete: bool,
    pub view: bool,
}

impl ModelPerms {
    /// Derives the flags from the viewer's `app.action_model` permissions.
    /// `change` implies `view`.
    pub fn for_viewer(viewer: &Viewer, meta: &ModelMeta) -> Self {
        let change = viewer.has_perm(&meta.perm("change"));
        Self {
            add: viewer.has_perm(&meta.perm("add")),
            change,
            delete: viewer.has_perm(&meta.perm("delete")),
            view: change || viewer.has_perm(&meta.perm("view")),
        }
    }

    /// Whether any flag is set.
    pub fn any(&self) -> bool {
        self.add || self.change || self.delete || self.view
    }
}

/// Admin behaviour of one registered model.
pub trait ModelAdmin: Send + Sync {
    /// Whether the viewer sees the model's app at all.
    fn has_module_permission(&self, viewer: &Viewer, meta: &ModelMeta) -> bool {
        viewer.has_module_perms(&meta.app_label)
    }

    fn get_model_perms(&self, viewer: &Viewer, meta: &ModelMeta) -> ModelPerms {
        ModelPerms::for_viewer(viewer, meta)
    }

    /// Routes served under `{app_label}/{model_name}/`.
    ///
    /// Naming a route `{app_label}_{model_name}_changelist` or
    /// `{app_label}_{model_name}_add` links it from the app index.
    fn urls(&self, _meta: &ModelMeta) -> RouteTable {
        RouteTable::new()
    }
}

/// A model admin with no routes of its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultModelAdmin;

impl ModelAdmin for DefaultModelAdmin {}

/// One model in the app index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEntry {
    pub name: String,
    pub icon: String,
    pub object_name: String,
    pub perms: ModelPerms,
    pub admin_url: Option<String>,
    pub add_url: Option<String>,
    /// Set when the viewer may view or change; true when view-only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_only: Option<bool>,
}

/// One app in the app index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppEntry {
    pub name: String,
    pub icon: String,
    pub app_label: String,
    pub app_url: String,
    pub has_module_perms: bool,
    pub models: Vec<ModelEntry>,
}

/// The admin site.
///
/// Holds the models registered for administration in registration order
/// and builds the per-viewer app index from them.
pub struct AdminSite {
    pub(crate) dispatcher: HookDispatcher,
    pub(crate) apps: Arc<AppRegistry>,
    pub(crate) settings: Arc<CoreplusSettings>,
    pub(crate) settings_registry: Arc<SettingsRegistry>,
    pub(crate) config: AdminConfig,
    registry: RwLock<Vec<(ModelMeta, Arc<dyn ModelAdmin>)>>,
}

impl AdminSite {
    pub fn new(
        dispatcher: HookDispatcher,
        apps: Arc<AppRegistry>,
        settings: Arc<CoreplusSettings>,
        settings_registry: Arc<SettingsRegistry>,
        config: AdminConfig,
    ) -> Self {
        Self {
            dispatcher,
            apps,
            settings,
            settings_registry,
            config,
            registry: RwLock::new(Vec::new()),
        }
    }

    /// Absolute path the site is mounted at, e.g. `"/admin/"`.
    pub fn mount_path(&self) -> String {
        format!("/{}", self.config.url_prefix.trim_start_matches('/'))
    }

    /// Registers `meta` for administration.
    ///
    /// The model's app must be installed; registering a model twice is a
    /// configuration error.
    pub async fn register(&self, meta: ModelMeta, admin: Arc<dyn ModelAdmin>) -> AppResult<()> {
        if self.apps.get_app_config(&meta.app_label).is_none() {
            return Err(AppError::configuration(format!(
                "Cannot register model '{}': app '{}' is not installed",
                meta.label(),
                meta.app_label
            )));
        }

        let mut registry = self.registry.write().await;
        if registry.iter().any(|(existing, _)| *existing == meta) {
            return Err(AppError::configuration(format!(
                "The model {} is already registered",
                meta.object_name
            )));
        }

        info!(model = %meta.label(), "Model registered with admin");
        registry.push((meta, admin));
        Ok(())
    }

    pub async fn is_registered(&self, meta: &ModelMeta) -> bool {
        self.registry
            .read()
            .await
            .iter()
            .any(|(existing, _)| existing == meta)
    }

    /// Registered models and their admins in registration order.
    pub async fn registered(&self) -> Vec<(ModelMeta, Arc<dyn ModelAdmin>)> {
        self.registry.read().await.clone()
    }

    /// Values shared by every admin page.
    pub fn each_context(&self) -> AppResult<SiteContext> {
        Ok(SiteContext {
            site_title: self.settings.site_title()?,
            site_header: self.settings.site_header()?,
            is_app_index_enabled: self.config.enable_app_index,
        })
    }

    async fn build_app_dict(&self, viewer: &Viewer, label: Option<&str>) -> AppResult<Vec<AppEntry>> {
        let excludes = self.settings.app_index_excludes()?;
        let default_icons = self.settings.default_app_icons()?;
        let mount_path = self.mount_path();

        let mut apps: Vec<AppEntry> = Vec::new();
        for (meta, model_admin) in self.registry.read().await.iter() {
            if label.is_some_and(|label| label != meta.app_label) {
                continue;
            }
            if excludes.contains(&meta.app_label) {
                continue;
            }
            let Some(app_config) = self.apps.get_app_config(&meta.app_label) else {
                continue;
            };

            let has_module_perms = model_admin.has_module_permission(viewer, meta);
            if !has_module_perms {
                continue;
            }
            let perms = model_admin.get_model_perms(viewer, meta);
            if !perms.any() {
                continue;
            }

            let model_urls = model_admin.urls(meta);
            let model_url = |action: &str| {
                model_urls
                    .reverse(
                        &format!("{}_{}_{action}", meta.app_label, meta.model_name),
                        &[],
                    )
                    .map(|rel| format!("{mount_path}{}/{}{rel}", meta.app_label, meta.model_name))
            };

            let mut entry = ModelEntry {
                name: capfirst(&meta.verbose_name_plural),
                icon: meta.icon.clone().unwrap_or_else(|| {
                    if meta.model_name == "user" {
                        DEFAULT_USER_ICON.to_string()
                    } else {
                        DEFAULT_MODEL_ICON.to_string()
                    }
                }),
                object_name: meta.object_name.clone(),
                perms,
                admin_url: None,
                add_url: None,
                view_only: None,
            };
            if perms.change || perms.view {
                entry.view_only = Some(!perms.change);
                entry.admin_url = model_url("changelist");
            }
            if perms.add {
                entry.add_url = model_url("add");
            }

            match apps.iter_mut().find(|app| app.app_label == meta.app_label) {
                Some(app) => app.models.push(entry),
                None => apps.push(AppEntry {
                    name: app_config.verbose_name(),
                    icon: app_config
                        .icon()
                        .map(str::to_string)
                        .or_else(|| default_icons.get(&meta.app_label).cloned())
                        .unwrap_or_else(|| DEFAULT_APP_ICON.to_string()),
                    app_label: meta.app_label.clone(),
                    app_url: format!("{mount_path}{}/", meta.app_label),
                    has_module_perms,
                    models: vec![entry],
                }),
            }
        }

        Ok(apps)
    }

    /// Apps and models visible to `viewer`, sorted by display name.
    ///
    /// Excluded namespaces, models the viewer has no permission on, and
    /// apps that opt out of the index are left out.
    pub async fn get_app_list(&self, viewer: &Viewer) -> AppResult<Vec<AppEntry>> {
        let mut apps = self.build_app_dict(viewer, None).await?;
        apps.sort_by_key(|app| app.name.to_lowercase());
        apps.retain(|app| {
            self.apps
                .get_app_config(&app.app_label)
                .is_some_and(|config| config.show_app_index())
        });
        for app in &mut apps {
            app.models.sort_by(|a, b| a.name.cmp(&b.name));
        }

        debug!(
            username = %viewer.username,
            apps = apps.len(),
            "App list built"
        );
        Ok(apps)
    }

    /// Index page of one app.
    ///
    /// Not found when the app index is disabled, or when the label has no
    /// models visible to `viewer`.
    pub async fn app_index(&self, viewer: &Viewer, app_label: &str) -> AppResult<AppIndexResponse> {
        if !self.config.enable_app_index {
            return Err(AppError::not_found("The app index page is disabled."));
        }

        let mut app = self
            .build_app_dict(viewer, Some(app_label))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::not_found("The requested admin page does not exist."))?;
        app.models.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(AppIndexResponse {
            title: format!("{} Administration", app.name),
            site: self.each_context()?,
            app_label: app_label.to_string(),
            app_list: vec![app],
        })
    }
}

impl fmt::Debug for AdminSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminSite")
            .field("mount_path", &self.mount_path())
            .field("enable_app_index", &self.config.enable_app_index)
            .finish()
    }
}
