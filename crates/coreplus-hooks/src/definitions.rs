//! Well-known hook names, the invocation context, and the descriptor
//! shapes contributors return.

use std::fmt;
use std::sync::Arc;

use axum::routing::MethodRouter;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use coreplus_core::error::AppError;
use coreplus_core::result::AppResult;
use coreplus_core::routing::{RouteTable, ViewClass, ViewSet};
use coreplus_core::types::{ModelMeta, Viewer};

// ── API ──
/// Viewset registrations for API version 1.
pub const API_V1_VIEWSET_HOOK: &str = "API_V1_VIEWSET_HOOK";
/// One-off API views for API version 1.
pub const API_V1_VIEW_HOOK: &str = "API_V1_VIEW_HOOK";
/// Included URL modules for API version 1.
pub const API_V1_URL_PATTERNS: &str = "API_V1_URL_PATTERNS";
/// Viewset registrations for API version 2.
pub const API_V2_VIEWSET_HOOK: &str = "API_V2_VIEWSET_HOOK";
/// One-off API views for API version 2.
pub const API_V2_VIEW_HOOK: &str = "API_V2_VIEW_HOOK";
/// Included URL modules for API version 2.
pub const API_V2_URL_PATTERNS: &str = "API_V2_URL_PATTERNS";

// ── Admin ──
/// Settings navigation menu entries.
pub const REGISTER_SETTINGS_MENU_ITEM: &str = "REGISTER_SETTINGS_MENU_ITEM";
/// Custom admin views.
pub const REGISTER_ADMIN_VIEW: &str = "REGISTER_ADMIN_VIEW";

/// Call-site arguments handed to every contributor of a hook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookContext {
    /// The hook being consulted.
    pub hook: String,
    /// The user on whose behalf the hook is consulted, if any.
    pub viewer: Option<Viewer>,
    /// Arbitrary call-site data.
    pub data: Map<String, Value>,
    /// Correlation id of this invocation.
    pub request_id: Uuid,
    /// When the invocation started.
    pub timestamp: DateTime<Utc>,
}

impl HookContext {
    /// Creates an empty context for `hook`.
    pub fn new(hook: &str) -> Self {
        Self {
            hook: hook.to_string(),
            viewer: None,
            data: Map::new(),
            request_id: Uuid::new_v4(),
            timestamp: Utc::now(),
        }
    }

    /// Sets the viewer.
    pub fn with_viewer(mut self, viewer: Viewer) -> Self {
        self.viewer = Some(viewer);
        self
    }

    /// Inserts a data value.
    pub fn with_data(mut self, key: &str, value: Value) -> Self {
        self.data.insert(key.to_string(), value);
        self
    }

    /// Gets a string data value.
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(|v| v.as_str())
    }
}

/// `{prefix, viewset, basename}` returned by `API_V{n}_VIEWSET_HOOK`.
#[derive(Debug, Clone)]
pub struct ViewSetRegistration {
    /// URL prefix of the resource, e.g. `"contacts"`.
    pub prefix: String,
    /// The handler bundle.
    pub viewset: ViewSet,
    /// Route name stem; defaults to the viewset's basename.
    pub basename: Option<String>,
}

impl ViewSetRegistration {
    pub fn new(prefix: &str, viewset: ViewSet) -> Self {
        Self {
            prefix: prefix.to_string(),
            viewset,
            basename: None,
        }
    }

    pub fn with_basename(mut self, basename: &str) -> Self {
        self.basename = Some(basename.to_string());
        self
    }
}

/// `{view_class, url_path, name?, regex?}` returned by `API_V{n}_VIEW_HOOK`.
///
/// `view_class` and `url_path` are required; they are optional here so a
/// contributor that omits one is reported as a configuration error at
/// assembly instead of being unrepresentable.
#[derive(Clone, Default)]
pub struct ApiViewRegistration {
    pub view_class: Option<Arc<dyn ViewClass>>,
    pub url_path: Option<String>,
    pub name: Option<String>,
    pub regex: bool,
}

impl ApiViewRegistration {
    /// A complete descriptor serving `view_class` at `url_path`.
    pub fn new(view_class: Arc<dyn ViewClass>, url_path: &str) -> Self {
        Self {
            view_class: Some(view_class),
            url_path: Some(url_path.to_string()),
            name: None,
            regex: false,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Treat `url_path` as a regular expression.
    pub fn as_regex(mut self) -> Self {
        self.regex = true;
        self
    }
}

impl fmt::Debug for ApiViewRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiViewRegistration")
            .field(
                "view_class",
                &self.view_class.as_ref().map(|view| view.class_name()),
            )
            .field("url_path", &self.url_path)
            .field("name", &self.name)
            .field("regex", &self.regex)
            .finish()
    }
}

/// `(url_path, module)` returned by `API_V{n}_URL_PATTERNS`.
#[derive(Debug, Clone)]
pub struct UrlInclude {
    /// Mount prefix, e.g. `"contacts/"`.
    pub url_path: String,
    /// The included route table.
    pub module: RouteTable,
}

impl UrlInclude {
    pub fn new(url_path: &str, module: RouteTable) -> Self {
        Self {
            url_path: url_path.to_string(),
            module,
        }
    }
}

/// `{type, label, url}` returned by `REGISTER_SETTINGS_MENU_ITEM`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsMenuItem {
    /// The setting type the entry edits.
    pub model: ModelMeta,
    /// Menu label.
    pub label: String,
    /// Edit URL.
    pub url: String,
}

/// Handler of a contributed admin view.
#[derive(Clone)]
pub enum AdminHandler {
    /// A plain request handler.
    Function(MethodRouter),
    /// A view class; must be able to produce a handler.
    Class(Arc<dyn ViewClass>),
}

impl AdminHandler {
    /// Resolves the request handler, checking the dispatch capability of
    /// class-based views.
    pub fn resolve(&self, url_path: &str) -> AppResult<MethodRouter> {
        match self {
            Self::Function(handler) => Ok(handler.clone()),
            Self::Class(view) => view.as_view().ok_or_else(|| {
                AppError::configuration(format!(
                    "Admin view '{}' at '{url_path}' cannot dispatch requests",
                    view.class_name()
                ))
            }),
        }
    }
}

impl fmt::Debug for AdminHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function(_) => f.write_str("Function"),
            Self::Class(view) => write!(f, "Class({})", view.class_name()),
        }
    }
}

/// `(url_path, handler, name)` returned by `REGISTER_ADMIN_VIEW`.
#[derive(Debug, Clone)]
pub struct AdminViewRegistration {
    pub url_path: String,
    pub handler: AdminHandler,
    pub name: String,
}

impl AdminViewRegistration {
    pub fn new(url_path: &str, handler: AdminHandler, name: &str) -> Self {
        Self {
            url_path: url_path.to_string(),
            handler,
            name: name.to_string(),
        }
    }
}

/// Value returned by a contributor.
///
/// Each hook convention expects one variant; consumers narrow with the
/// matching `expect_*` method.
#[derive(Debug, Clone, Default)]
pub enum HookValue {
    /// Nothing to contribute for this context.
    #[default]
    None,
    ViewSet(ViewSetRegistration),
    ApiView(ApiViewRegistration),
    UrlInclude(UrlInclude),
    SettingsMenuItem(SettingsMenuItem),
    AdminView(AdminViewRegistration),
    /// Free-form value for hooks without a typed convention.
    Json(Value),
}

impl HookValue {
    /// Short name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::ViewSet(_) => "viewset",
            Self::ApiView(_) => "api_view",
            Self::UrlInclude(_) => "url_include",
            Self::SettingsMenuItem(_) => "settings_menu_item",
            Self::AdminView(_) => "admin_view",
            Self::Json(_) => "json",
        }
    }

    /// Whether the contributor had nothing to contribute.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    fn mismatch(&self, hook: &str, expected: &str) -> AppError {
        AppError::invalid_type(format!(
            "Contributor of '{hook}' returned {} where {expected} was expected",
            self.kind()
        ))
    }

    pub fn expect_viewset(self, hook: &str) -> AppResult<ViewSetRegistration> {
        match self {
            Self::ViewSet(registration) => Ok(registration),
            other => Err(other.mismatch(hook, "a viewset registration")),
        }
    }

    pub fn expect_api_view(self, hook: &str) -> AppResult<ApiViewRegistration> {
        match self {
            Self::ApiView(registration) => Ok(registration),
            other => Err(other.mismatch(hook, "an api view registration")),
        }
    }

    pub fn expect_url_include(self, hook: &str) -> AppResult<UrlInclude> {
        match self {
            Self::UrlInclude(include) => Ok(include),
            other => Err(other.mismatch(hook, "a url include")),
        }
    }

    /// Narrows to an optional menu item; `None` is a valid answer.
    pub fn expect_settings_menu_item(self, hook: &str) -> AppResult<Option<SettingsMenuItem>> {
        match self {
            Self::SettingsMenuItem(item) => Ok(Some(item)),
            Self::None => Ok(None),
            other => Err(other.mismatch(hook, "a settings menu item")),
        }
    }

    pub fn expect_admin_view(self, hook: &str) -> AppResult<AdminViewRegistration> {
        match self {
            Self::AdminView(registration) => Ok(registration),
            other => Err(other.mismatch(hook, "an admin view registration")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coreplus_core::error::ErrorKind;

    #[test]
    fn test_expect_reports_hook_and_kind() {
        let err = HookValue::Json(Value::Null)
            .expect_viewset(API_V1_VIEWSET_HOOK)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidType);
        assert!(err.message.contains("API_V1_VIEWSET_HOOK"));
        assert!(err.message.contains("json"));
    }

    #[test]
    fn test_menu_item_accepts_none() {
        let item = HookValue::None
            .expect_settings_menu_item(REGISTER_SETTINGS_MENU_ITEM)
            .unwrap();
        assert!(item.is_none());
    }

    #[test]
    fn test_context_builder() {
        let ctx = HookContext::new(REGISTER_ADMIN_VIEW)
            .with_viewer(Viewer::new("ada").staff())
            .with_data("path", Value::from("/admin/"));
        assert_eq!(ctx.hook, REGISTER_ADMIN_VIEW);
        assert_eq!(ctx.get_string("path"), Some("/admin/"));
        assert!(ctx.viewer.is_some());
    }
}
