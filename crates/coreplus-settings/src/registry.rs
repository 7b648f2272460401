//! Settings registry: the ordered list of setting types.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::{debug, info};

use coreplus_core::result::AppResult;
use coreplus_core::types::model::title_case;
use coreplus_core::types::{ModelMeta, Viewer};
use coreplus_hooks::definitions::REGISTER_SETTINGS_MENU_ITEM;
use coreplus_hooks::{
    AppRegistry, Contributor, HookContext, HookDirectory, HookDispatcher, HookValue,
    SettingsMenuItem,
};

use crate::permissions::user_can_edit_setting_type;

/// Ordered, duplicate-free list of setting types.
pub struct SettingsRegistry {
    models: RwLock<Vec<ModelMeta>>,
    hooks: Arc<HookDirectory>,
    apps: Arc<AppRegistry>,
    /// Prefix of the settings edit URLs, e.g. `"/admin/settings/"`.
    edit_url_prefix: String,
    /// Saved values keyed by `app_label.model_name`.
    values: DashMap<String, Map<String, Value>>,
}

impl SettingsRegistry {
    pub fn new(hooks: Arc<HookDirectory>, apps: Arc<AppRegistry>, edit_url_prefix: &str) -> Self {
        Self {
            models: RwLock::new(Vec::new()),
            hooks,
            apps,
            edit_url_prefix: edit_url_prefix.to_string(),
            values: DashMap::new(),
        }
    }

    /// Edit URL of a setting type.
    pub fn edit_url(&self, meta: &ModelMeta) -> String {
        format!(
            "{}{}/{}/",
            self.edit_url_prefix, meta.app_label, meta.model_name
        )
    }

    /// Registers `meta` as a setting type and contributes its settings
    /// menu entry. Registering the same type again does nothing.
    pub async fn register(&self, meta: ModelMeta) -> AppResult<ModelMeta> {
        {
            let mut models = self.models.write().await;
            if models.contains(&meta) {
                debug!(model = %meta.label(), "Setting type already registered");
                return Ok(meta);
            }
            models.push(meta.clone());
        }

        let captured = meta.clone();
        let url = self.edit_url(&meta);
        let menu_entry = Contributor::new(module_path!(), "settings_menu_hook", move |ctx| {
            match &ctx.viewer {
                Some(viewer) if user_can_edit_setting_type(viewer, &captured) => {
                    HookValue::SettingsMenuItem(SettingsMenuItem {
                        model: captured.clone(),
                        label: title_case(&captured.verbose_name_plural),
                        url: url.clone(),
                    })
                }
                _ => HookValue::None,
            }
        })
        .with_documentation(&format!("Settings menu entry for {}.", meta.label()));

        self.hooks
            .register(REGISTER_SETTINGS_MENU_ITEM, menu_entry)
            .await?;

        info!(model = %meta.label(), "Setting type registered");
        Ok(meta)
    }

    /// Decorator-friendly form of [`register`](Self::register): returns the
    /// type unchanged.
    pub async fn register_setting(&self, meta: ModelMeta) -> AppResult<ModelMeta> {
        self.register(meta).await
    }

    /// Registers the setting types declared by every installed app.
    pub async fn register_installed(&self) -> AppResult<()> {
        for app in self.apps.iter() {
            for meta in app.setting_types() {
                self.register(meta).await?;
            }
        }
        Ok(())
    }

    /// Resolves a registered setting type.
    ///
    /// Returns `None` when the pair does not name a model of an installed
    /// app or the model was never registered as a setting.
    pub async fn lookup(&self, app_label: &str, model_name: &str) -> AppResult<Option<ModelMeta>> {
        self.hooks.ensure_loaded().await?;

        let Some(model) = self.apps.get_model(app_label, model_name) else {
            return Ok(None);
        };
        let models = self.models.read().await;
        Ok(models.contains(&model).then_some(model))
    }

    /// Registered setting types in registration order.
    pub async fn models(&self) -> AppResult<Vec<ModelMeta>> {
        self.hooks.ensure_loaded().await?;
        Ok(self.models.read().await.clone())
    }

    pub async fn len(&self) -> usize {
        self.models.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.models.read().await.is_empty()
    }

    /// Saved fields of a setting type; empty until first saved.
    pub fn value_of(&self, meta: &ModelMeta) -> Map<String, Value> {
        self.values
            .get(&value_key(meta))
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Merges `fields` into the saved value of a setting type and returns
    /// the result.
    pub fn save(&self, meta: &ModelMeta, fields: Map<String, Value>) -> Map<String, Value> {
        let mut entry = self.values.entry(value_key(meta)).or_default();
        entry.value_mut().extend(fields);
        info!(model = %meta.label(), "Setting saved");
        entry.value().clone()
    }

    /// Settings menu entries visible to `viewer`.
    pub async fn menu_items(&self, viewer: &Viewer) -> AppResult<Vec<SettingsMenuItem>> {
        let ctx = HookContext::new(REGISTER_SETTINGS_MENU_ITEM).with_viewer(viewer.clone());
        let values = HookDispatcher::new(Arc::clone(&self.hooks))
            .invoke(REGISTER_SETTINGS_MENU_ITEM, &ctx)
            .await?;

        let mut items = Vec::new();
        for value in values {
            if let Some(item) = value.expect_settings_menu_item(REGISTER_SETTINGS_MENU_ITEM)? {
                items.push(item);
            }
        }
        Ok(items)
    }
}

fn value_key(meta: &ModelMeta) -> String {
    format!("{}.{}", meta.app_label, meta.model_name)
}

impl fmt::Debug for SettingsRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsRegistry")
            .field("edit_url_prefix", &self.edit_url_prefix)
            .finish()
    }
}
