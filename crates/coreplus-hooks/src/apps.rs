//! Installed applications and the hook modules they expose.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use coreplus_core::error::AppError;
use coreplus_core::result::AppResult;
use coreplus_core::types::ModelMeta;
use coreplus_core::types::model::capfirst;

use crate::registry::HookDirectory;

/// Module of an installed app that registers contributors.
#[async_trait]
pub trait HookModule: Send + Sync {
    /// Registers this module's contributors.
    async fn register(&self, hooks: &HookDirectory) -> AppResult<()>;
}

/// A reusable sub-application compiled into the server.
pub trait InstalledApp: Send + Sync {
    /// Full name used in the `installed_apps` list, e.g. `"coreplus.contacts"`.
    fn name(&self) -> &str;

    /// Short unique label, e.g. `"contacts"`.
    fn label(&self) -> &str;

    /// Display name.
    fn verbose_name(&self) -> String {
        capfirst(self.label())
    }

    /// Icon token shown in the admin app list.
    fn icon(&self) -> Option<&str> {
        None
    }

    /// Whether the admin lists this app.
    fn show_app_index(&self) -> bool {
        true
    }

    /// Models declared by this app.
    fn models(&self) -> Vec<ModelMeta> {
        Vec::new()
    }

    /// Models editable as site settings.
    fn setting_types(&self) -> Vec<ModelMeta> {
        Vec::new()
    }

    /// The hook module called `module_name`, if the app has one.
    fn hook_module(&self, _module_name: &str) -> Option<Arc<dyn HookModule>> {
        None
    }
}

/// Installed apps in installation order.
#[derive(Clone, Default)]
pub struct AppRegistry {
    apps: Vec<Arc<dyn InstalledApp>>,
}

impl AppRegistry {
    /// Creates a registry from apps in installation order.
    pub fn new(apps: Vec<Arc<dyn InstalledApp>>) -> Self {
        Self { apps }
    }

    /// Selects the apps named in `installed` from `catalog`, in the order
    /// of `installed`. An empty list installs the whole catalog.
    ///
    /// Unknown names and duplicate labels are configuration errors.
    pub fn from_installed(
        catalog: Vec<Arc<dyn InstalledApp>>,
        installed: &[String],
    ) -> AppResult<Self> {
        let apps = if installed.is_empty() {
            catalog
        } else {
            installed
                .iter()
                .map(|name| {
                    catalog
                        .iter()
                        .find(|app| app.name() == name || app.label() == name)
                        .cloned()
                        .ok_or_else(|| {
                            AppError::configuration(format!("Unknown installed app '{name}'"))
                        })
                })
                .collect::<AppResult<Vec<_>>>()?
        };

        let mut labels = HashSet::new();
        for app in &apps {
            if !labels.insert(app.label().to_string()) {
                return Err(AppError::configuration(format!(
                    "Application labels aren't unique, duplicates: {}",
                    app.label()
                )));
            }
        }

        info!(
            apps = ?apps.iter().map(|app| app.label()).collect::<Vec<_>>(),
            "Installed apps loaded"
        );
        Ok(Self { apps })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn InstalledApp>> {
        self.apps.iter()
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    /// The app with label `app_label`.
    pub fn get_app_config(&self, app_label: &str) -> Option<Arc<dyn InstalledApp>> {
        self.apps
            .iter()
            .find(|app| app.label() == app_label)
            .cloned()
    }

    /// Resolves a model; `model_name` is matched case-insensitively.
    pub fn get_model(&self, app_label: &str, model_name: &str) -> Option<ModelMeta> {
        self.get_app_config(app_label)?
            .models()
            .into_iter()
            .find(|model| model.matches(app_label, model_name))
    }
}

impl fmt::Debug for AppRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.apps.iter().map(|app| app.name()))
            .finish()
    }
}
