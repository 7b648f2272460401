//! Hook directory: contributors registered by hook name with priority
//! ordering, populated once from the hook modules of installed apps.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tokio::sync::{OnceCell, RwLock};
use tracing::{debug, error, info};

use coreplus_core::error::{AppError, ErrorKind};
use coreplus_core::result::AppResult;

use crate::apps::AppRegistry;
use crate::definitions::{HookContext, HookValue};

/// Signature of a contributor callable.
pub type ContributorFn = dyn Fn(&HookContext) -> HookValue + Send + Sync;

/// A callable attached to one or more hooks, with the metadata operators
/// see in the hook registry view.
#[derive(Clone)]
pub struct Contributor {
    func: Arc<ContributorFn>,
    /// Module path the contributor was declared in.
    pub module: String,
    /// Function name.
    pub function: String,
    /// Documentation shown to operators.
    pub documentation: Option<String>,
}

impl Contributor {
    /// Wraps `func`. Prefer the [`contributor!`](crate::contributor) macro,
    /// which fills in the module path.
    pub fn new<F>(module: &str, function: &str, func: F) -> Self
    where
        F: Fn(&HookContext) -> HookValue + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
            module: module.to_string(),
            function: function.to_string(),
            documentation: None,
        }
    }

    pub fn with_documentation(mut self, documentation: &str) -> Self {
        self.documentation = Some(documentation.to_string());
        self
    }

    /// Invokes the contributor.
    pub fn call(&self, ctx: &HookContext) -> HookValue {
        (self.func)(ctx)
    }
}

impl fmt::Debug for Contributor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Contributor")
            .field("module", &self.module)
            .field("function", &self.function)
            .finish()
    }
}

/// Entry in the hook directory.
#[derive(Debug, Clone)]
pub struct HookEntry {
    /// The contributor.
    pub contributor: Contributor,
    /// Priority (lower = earlier).
    pub priority: i32,
}

/// One or more hook names a contributor is registered under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookNames(Vec<String>);

impl HookNames {
    /// The names. Any string is a hook name; an empty list registers nothing.
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<&str> for HookNames {
    fn from(name: &str) -> Self {
        Self(vec![name.to_string()])
    }
}

impl From<String> for HookNames {
    fn from(name: String) -> Self {
        Self(vec![name])
    }
}

impl From<Vec<String>> for HookNames {
    fn from(names: Vec<String>) -> Self {
        Self(names)
    }
}

impl From<Vec<&str>> for HookNames {
    fn from(names: Vec<&str>) -> Self {
        Self(names.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for HookNames {
    fn from(names: &[&str]) -> Self {
        Self(names.iter().map(|name| name.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for HookNames {
    fn from(names: [&str; N]) -> Self {
        Self(names.iter().map(|name| name.to_string()).collect())
    }
}

/// Directory of contributors organized by hook name.
///
/// The directory is filled lazily: the first lookup awaits the hook module
/// of every installed app, exactly once per directory. A hook module must
/// not look up hooks while it registers, since discovery is still in
/// progress at that point.
pub struct HookDirectory {
    /// Hook name → contributors sorted by priority.
    hooks: RwLock<HashMap<String, Vec<HookEntry>>>,
    apps: Arc<AppRegistry>,
    module_name: String,
    discovery: OnceCell<AppResult<()>>,
}

impl HookDirectory {
    /// Creates a directory that discovers hook modules named `module_name`
    /// in the installed `apps`.
    pub fn new(apps: Arc<AppRegistry>, module_name: &str) -> Self {
        Self {
            hooks: RwLock::new(HashMap::new()),
            apps,
            module_name: module_name.to_string(),
            discovery: OnceCell::new(),
        }
    }

    /// The installed apps this directory discovers hooks in.
    pub fn apps(&self) -> &Arc<AppRegistry> {
        &self.apps
    }

    /// Name of the hook module looked up in every app.
    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    /// Registers `contributor` under `names` with priority 0.
    pub async fn register(
        &self,
        names: impl Into<HookNames>,
        contributor: Contributor,
    ) -> AppResult<()> {
        self.insert(names.into(), contributor, 0).await
    }

    /// Returns a registrar that registers with `priority`.
    pub fn with_priority(&self, priority: i32) -> PriorityRegistrar<'_> {
        PriorityRegistrar {
            directory: self,
            priority,
        }
    }

    async fn insert(
        &self,
        names: HookNames,
        contributor: Contributor,
        priority: i32,
    ) -> AppResult<()> {
        let names = names.into_vec();

        let mut hooks = self.hooks.write().await;
        for name in names {
            let entries = hooks.entry(name.clone()).or_default();
            entries.push(HookEntry {
                contributor: contributor.clone(),
                priority,
            });

            // Stable: equal priorities keep registration order
            entries.sort_by_key(|e| e.priority);

            info!(
                hook = %name,
                module = %contributor.module,
                function = %contributor.function,
                priority = priority,
                "Hook contributor registered"
            );
        }

        Ok(())
    }

    /// Runs discovery if it has not run yet.
    ///
    /// A failed discovery is remembered and returned to every later caller;
    /// it is never retried.
    pub async fn ensure_loaded(&self) -> AppResult<()> {
        self.discovery
            .get_or_init(|| self.discover())
            .await
            .clone()
    }

    /// Whether discovery has completed (successfully or not).
    pub fn is_loaded(&self) -> bool {
        self.discovery.initialized()
    }

    async fn discover(&self) -> AppResult<()> {
        info!(
            module = %self.module_name,
            apps = self.apps.len(),
            "Discovering hook modules"
        );

        let mut loaded = 0usize;
        for app in self.apps.iter() {
            let Some(module) = app.hook_module(&self.module_name) else {
                debug!(app = %app.name(), "App has no hook module");
                continue;
            };

            if let Err(e) = module.register(self).await {
                error!(
                    app = %app.name(),
                    module = %self.module_name,
                    error = %e,
                    "Hook module failed to register"
                );
                return Err(AppError::with_source(
                    ErrorKind::Discovery,
                    format!(
                        "Hook module '{}' of app '{}' failed: {}",
                        self.module_name,
                        app.name(),
                        e.message
                    ),
                    e,
                ));
            }

            loaded += 1;
            debug!(app = %app.name(), "Hook module registered");
        }

        info!(modules = loaded, "Hook discovery complete");
        Ok(())
    }

    /// Returns the contributors of `name` in priority order; empty if the
    /// hook has none.
    pub async fn get(&self, name: &str) -> AppResult<Vec<Contributor>> {
        self.ensure_loaded().await?;

        let hooks = self.hooks.read().await;
        Ok(hooks
            .get(name)
            .map(|entries| entries.iter().map(|e| e.contributor.clone()).collect())
            .unwrap_or_default())
    }

    /// Returns a snapshot of every hook and its entries.
    pub async fn get_all(&self) -> AppResult<HashMap<String, Vec<HookEntry>>> {
        self.ensure_loaded().await?;
        Ok(self.hooks.read().await.clone())
    }

    /// Returns whether any contributor is registered for `name`.
    pub async fn has_contributors(&self, name: &str) -> AppResult<bool> {
        self.ensure_loaded().await?;
        let hooks = self.hooks.read().await;
        Ok(hooks.get(name).is_some_and(|entries| !entries.is_empty()))
    }

    /// Returns all hook names with contributors, sorted.
    pub async fn hook_names(&self) -> AppResult<Vec<String>> {
        self.ensure_loaded().await?;
        let hooks = self.hooks.read().await;
        let mut names: Vec<String> = hooks.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

impl fmt::Debug for HookDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookDirectory")
            .field("module_name", &self.module_name)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

/// Registers contributors with a fixed priority.
#[derive(Debug, Clone, Copy)]
pub struct PriorityRegistrar<'a> {
    directory: &'a HookDirectory,
    priority: i32,
}

impl PriorityRegistrar<'_> {
    /// Registers `contributor` under `names` with this registrar's priority.
    pub async fn register(
        &self,
        names: impl Into<HookNames>,
        contributor: Contributor,
    ) -> AppResult<()> {
        self.directory
            .insert(names.into(), contributor, self.priority)
            .await
    }
}
