//! Resource view-sets: a list endpoint, a detail endpoint and extra actions.

use std::fmt;

use axum::routing::MethodRouter;

/// An extra action exposed by a [`ViewSet`].
#[derive(Clone)]
pub struct ViewSetAction {
    /// Path segment of the action, e.g. `"reset-password"`.
    pub url_path: String,
    /// Suffix of the route name; defaults to `url_path`.
    pub url_name: String,
    /// Whether the action is mounted under the detail path.
    pub detail: bool,
    /// Request handler.
    pub handler: MethodRouter,
}

impl ViewSetAction {
    /// An action on the collection (`prefix/url_path/`).
    pub fn collection(url_path: &str, handler: MethodRouter) -> Self {
        Self {
            url_path: url_path.to_string(),
            url_name: url_path.to_string(),
            detail: false,
            handler,
        }
    }

    /// An action on one member (`prefix/{pk}/url_path/`).
    pub fn member(url_path: &str, handler: MethodRouter) -> Self {
        Self {
            detail: true,
            ..Self::collection(url_path, handler)
        }
    }

    /// Overrides the route name suffix.
    pub fn with_url_name(mut self, url_name: &str) -> Self {
        self.url_name = url_name.to_string();
        self
    }
}

impl fmt::Debug for ViewSetAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewSetAction")
            .field("url_path", &self.url_path)
            .field("url_name", &self.url_name)
            .field("detail", &self.detail)
            .finish()
    }
}

/// A resource handler bundle registered with a view-set router.
#[derive(Clone)]
pub struct ViewSet {
    /// Name of the view-set, used as the default basename.
    pub name: String,
    /// Handler for the collection path.
    pub list: Option<MethodRouter>,
    /// Handler for the member path.
    pub detail: Option<MethodRouter>,
    /// Extra actions in declaration order.
    pub actions: Vec<ViewSetAction>,
}

impl ViewSet {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            list: None,
            detail: None,
            actions: Vec::new(),
        }
    }

    pub fn with_list(mut self, handler: MethodRouter) -> Self {
        self.list = Some(handler);
        self
    }

    pub fn with_detail(mut self, handler: MethodRouter) -> Self {
        self.detail = Some(handler);
        self
    }

    pub fn with_action(mut self, action: ViewSetAction) -> Self {
        self.actions.push(action);
        self
    }

    /// Default basename: the lowercased name without a `ViewSet` suffix.
    pub fn basename(&self) -> String {
        let name = self.name.strip_suffix("ViewSet").unwrap_or(&self.name);
        name.to_lowercase()
    }
}

impl fmt::Debug for ViewSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewSet")
            .field("name", &self.name)
            .field("list", &self.list.is_some())
            .field("detail", &self.detail.is_some())
            .field("actions", &self.actions)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::post;

    #[test]
    fn test_basename_strips_suffix() {
        assert_eq!(ViewSet::new("UserViewSet").basename(), "user");
        assert_eq!(ViewSet::new("Contacts").basename(), "contacts");
    }

    #[test]
    fn test_member_action() {
        let action = ViewSetAction::member("reset-password", post(|| async {}))
            .with_url_name("reset-password-confirm");
        assert!(action.detail);
        assert_eq!(action.url_path, "reset-password");
        assert_eq!(action.url_name, "reset-password-confirm");
    }
}
