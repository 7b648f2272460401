//! Settings facade for Coreplus applications.
//!
//! [`CoreplusSettings`] answers every known setting from the user's
//! `[coreplus]` table first and falls back to the built-in defaults.
//! Resolved values are cached until a [`SettingChanged`] notification for
//! the `COREPLUS` setting arrives, at which point the cache is flushed.
//!
//! Settings listed as import strings hold a symbol path; the path is
//! resolved through the [`ImportRegistry`] the composition root filled
//! with the symbols it compiled in.

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::result::AppResult;

/// Name of the setting whose change flushes the facade cache.
pub const COREPLUS_SETTING: &str = "COREPLUS";

/// Settings whose values are import strings.
pub const IMPORT_STRINGS: &[&str] = &["schema_generator"];

/// Default symbol path of the API schema generator.
pub const DEFAULT_SCHEMA_GENERATOR: &str = "coreplus_api::schema::DefaultSchemaGenerator";

/// Built-in defaults for every known setting.
pub fn coreplus_defaults() -> Map<String, Value> {
    let defaults = json!({
        "hook_file_name": "corehooks",
        "app_index_excludes": [],
        "index_title": "Platform Administration",
        "site_title": "Platform Administration",
        "site_header": "Platform Administration",
        "default_app_icons": {
            "taggit": "tag-outline",
            "sites": "web",
            "account": "at",
            "socialaccount": "webhook",
            "auth": "account-circle-outline",
            "django_numerator": "barcode",
            "filer": "folder-open-outline",
            "cms": "book-open-outline",
        },
        "route_exclusions": {},
        "schema_generator": DEFAULT_SCHEMA_GENERATOR,
    });

    match defaults {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Notification that a framework-level setting was changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingChanged {
    /// Name of the changed setting.
    pub setting: String,
}

impl SettingChanged {
    /// Notification for the `COREPLUS` settings table.
    pub fn coreplus() -> Self {
        Self {
            setting: COREPLUS_SETTING.to_string(),
        }
    }
}

/// Symbol table that import-string settings are resolved against.
///
/// Values are stored type-erased; callers resolve them back to the type
/// they were registered as (usually an `Arc<dyn Trait>`).
#[derive(Default)]
pub struct ImportRegistry {
    symbols: DashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl std::fmt::Debug for ImportRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut paths: Vec<String> = self.symbols.iter().map(|e| e.key().clone()).collect();
        paths.sort();
        f.debug_struct("ImportRegistry")
            .field("symbols", &paths)
            .finish()
    }
}

impl ImportRegistry {
    /// Creates an empty symbol table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `value` importable under `path`, replacing any previous symbol.
    pub fn register<T: Any + Send + Sync>(&self, path: &str, value: T) {
        self.symbols.insert(path.to_string(), Arc::new(value));
    }

    /// Whether a symbol is registered under `path`.
    pub fn contains(&self, path: &str) -> bool {
        self.symbols.contains_key(path)
    }

    fn lookup(&self, path: &str) -> Option<Arc<dyn Any + Send + Sync>> {
        self.symbols.get(path).map(|e| Arc::clone(e.value()))
    }
}

/// Settings facade with defaults, lazy import resolution and caching.
#[derive(Debug)]
pub struct CoreplusSettings {
    /// Known settings and their defaults.
    defaults: Map<String, Value>,
    /// Settings whose values are import strings.
    import_strings: HashSet<String>,
    /// User overrides.
    user_settings: DashMap<String, Value>,
    /// Resolved values.
    cache: DashMap<String, Value>,
    /// Resolved import-string symbols, keyed by setting name.
    imported: DashMap<String, Arc<dyn Any + Send + Sync>>,
    /// Symbol table for import strings.
    imports: ImportRegistry,
}

impl CoreplusSettings {
    /// Creates a facade over the built-in defaults.
    pub fn new(user_settings: Map<String, Value>) -> Self {
        Self::with_defaults(
            user_settings,
            coreplus_defaults(),
            IMPORT_STRINGS.iter().map(|s| s.to_string()).collect(),
        )
    }

    /// Creates a facade over custom defaults and import-string keys.
    pub fn with_defaults(
        user_settings: Map<String, Value>,
        defaults: Map<String, Value>,
        import_strings: HashSet<String>,
    ) -> Self {
        Self {
            defaults,
            import_strings,
            user_settings: user_settings.into_iter().collect(),
            cache: DashMap::new(),
            imported: DashMap::new(),
            imports: ImportRegistry::new(),
        }
    }

    /// The symbol table import strings resolve against.
    pub fn imports(&self) -> &ImportRegistry {
        &self.imports
    }

    /// Returns the raw value of a known setting.
    pub fn get(&self, attr: &str) -> AppResult<Value> {
        let default = self
            .defaults
            .get(attr)
            .ok_or_else(|| AppError::configuration(format!("Invalid COREPLUS setting: '{attr}'")))?;

        if let Some(cached) = self.cache.get(attr) {
            return Ok(cached.value().clone());
        }

        let value = self
            .user_settings
            .get(attr)
            .map(|v| v.value().clone())
            .unwrap_or_else(|| default.clone());

        self.cache.insert(attr.to_string(), value.clone());
        Ok(value)
    }

    /// Returns a known setting deserialized into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, attr: &str) -> AppResult<T> {
        let value = self.get(attr)?;
        serde_json::from_value(value).map_err(|e| {
            AppError::configuration(format!("COREPLUS setting '{attr}' has the wrong type: {e}"))
        })
    }

    /// Resolves an import-string setting to the symbol it names.
    pub fn import<T: Any + Clone + Send + Sync>(&self, attr: &str) -> AppResult<T> {
        if !self.import_strings.contains(attr) {
            return Err(AppError::configuration(format!(
                "COREPLUS setting '{attr}' is not an import string"
            )));
        }

        let symbol = match self.imported.get(attr) {
            Some(symbol) => Arc::clone(symbol.value()),
            None => {
                let path: String = self.get_as(attr)?;
                let symbol = self.import_from_string(&path, attr)?;
                self.imported.insert(attr.to_string(), Arc::clone(&symbol));
                symbol
            }
        };

        symbol.downcast_ref::<T>().cloned().ok_or_else(|| {
            AppError::configuration(format!(
                "COREPLUS setting '{attr}' does not name a {}",
                std::any::type_name::<T>()
            ))
        })
    }

    fn import_from_string(&self, path: &str, attr: &str) -> AppResult<Arc<dyn Any + Send + Sync>> {
        self.imports.lookup(path).ok_or_else(|| {
            AppError::configuration(format!(
                "Could not import '{path}' for COREPLUS setting '{attr}'"
            ))
        })
    }

    /// Replaces the user overrides. Takes effect after the next reload.
    pub fn set_user_settings(&self, user_settings: Map<String, Value>) {
        self.user_settings.clear();
        for (key, value) in user_settings {
            self.user_settings.insert(key, value);
        }
    }

    /// Flushes every cached value and resolved import.
    pub fn reload(&self) {
        self.cache.clear();
        self.imported.clear();
        info!("COREPLUS settings reloaded");
    }

    /// Reacts to a setting-changed notification.
    pub fn on_setting_changed(&self, event: &SettingChanged) {
        if event.setting == COREPLUS_SETTING {
            self.reload();
        } else {
            debug!(setting = %event.setting, "Ignoring unrelated setting change");
        }
    }

    /// Spawns a task that reloads the facade whenever `COREPLUS` changes.
    pub fn spawn_change_listener(
        self: Arc<Self>,
        mut rx: broadcast::Receiver<SettingChanged>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => self.on_setting_changed(&event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Missed setting-changed notifications, reloading");
                        self.reload();
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    // ── Typed accessors ──────────────────────────────────────────

    /// Name of the per-application hook module.
    pub fn hook_file_name(&self) -> AppResult<String> {
        self.get_as("hook_file_name")
    }

    /// Namespaces hidden from the admin app index.
    pub fn app_index_excludes(&self) -> AppResult<Vec<String>> {
        self.get_as("app_index_excludes")
    }

    /// Namespace → icon token used when an app declares no icon.
    pub fn default_app_icons(&self) -> AppResult<HashMap<String, String>> {
        self.get_as("default_app_icons")
    }

    /// Title of the admin index page.
    pub fn index_title(&self) -> AppResult<String> {
        self.get_as("index_title")
    }

    /// Text at the end of every admin page title.
    pub fn site_title(&self) -> AppResult<String> {
        self.get_as("site_title")
    }

    /// Admin page header.
    pub fn site_header(&self) -> AppResult<String> {
        self.get_as("site_header")
    }

    /// Viewset prefix → route-name suffixes removed from generated routes.
    pub fn route_exclusions(&self) -> AppResult<HashMap<String, Vec<String>>> {
        self.get_as("route_exclusions")
    }
}

impl Default for CoreplusSettings {
    fn default() -> Self {
        Self::new(Map::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn user(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_defaults_apply_without_user_settings() {
        let settings = CoreplusSettings::default();
        assert_eq!(settings.hook_file_name().unwrap(), "corehooks");
        assert!(settings.app_index_excludes().unwrap().is_empty());
        assert_eq!(
            settings.default_app_icons().unwrap().get("auth").map(String::as_str),
            Some("account-circle-outline")
        );
    }

    #[test]
    fn test_user_settings_override_defaults() {
        let settings = CoreplusSettings::new(user(json!({
            "hook_file_name": "extensions",
            "app_index_excludes": ["sites"],
        })));
        assert_eq!(settings.hook_file_name().unwrap(), "extensions");
        assert_eq!(settings.app_index_excludes().unwrap(), vec!["sites".to_string()]);
    }

    #[test]
    fn test_unknown_setting_is_configuration_error() {
        let settings = CoreplusSettings::default();
        let err = settings.get("no_such_setting").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[test]
    fn test_wrong_type_is_configuration_error() {
        let settings = CoreplusSettings::new(user(json!({ "app_index_excludes": 3 })));
        let err = settings.app_index_excludes().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[test]
    fn test_cached_until_reload() {
        let settings = CoreplusSettings::default();
        assert_eq!(settings.site_title().unwrap(), "Platform Administration");

        settings.set_user_settings(user(json!({ "site_title": "Ops" })));
        assert_eq!(settings.site_title().unwrap(), "Platform Administration");

        settings.on_setting_changed(&SettingChanged {
            setting: "DATABASES".to_string(),
        });
        assert_eq!(settings.site_title().unwrap(), "Platform Administration");

        settings.on_setting_changed(&SettingChanged::coreplus());
        assert_eq!(settings.site_title().unwrap(), "Ops");
    }

    #[test]
    fn test_import_resolves_registered_symbol() {
        let settings = CoreplusSettings::default();
        settings
            .imports()
            .register(DEFAULT_SCHEMA_GENERATOR, Arc::new("generator".to_string()));

        let symbol: Arc<String> = settings.import("schema_generator").unwrap();
        assert_eq!(symbol.as_str(), "generator");
    }

    #[test]
    fn test_import_of_unknown_path_fails() {
        let settings = CoreplusSettings::new(user(json!({
            "schema_generator": "missing::Generator",
        })));
        let err = settings.import::<Arc<String>>("schema_generator").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
        assert!(err.message.contains("missing::Generator"));
    }

    #[test]
    fn test_import_of_plain_setting_fails() {
        let settings = CoreplusSettings::default();
        let err = settings.import::<Arc<String>>("site_title").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_change_listener_reloads() {
        let settings = Arc::new(CoreplusSettings::default());
        let (tx, rx) = broadcast::channel(4);
        let handle = Arc::clone(&settings).spawn_change_listener(rx);

        assert_eq!(settings.index_title().unwrap(), "Platform Administration");
        settings.set_user_settings(user(json!({ "index_title": "Back office" })));
        tx.send(SettingChanged::coreplus()).unwrap();
        drop(tx);
        handle.await.unwrap();

        assert_eq!(settings.index_title().unwrap(), "Back office");
    }
}
