//! View classes: descriptors that may be able to produce a request handler.

use std::fmt;

use axum::routing::MethodRouter;

/// A class-like view declared by a contributor.
///
/// [`as_view`](ViewClass::as_view) is the capability check: a view that
/// cannot produce a handler returns `None` and is rejected at assembly.
pub trait ViewClass: Send + Sync {
    /// Name of the view class, e.g. `"ContactSearch"`.
    fn class_name(&self) -> &str;

    /// Produces the handler, if this view can serve requests.
    fn as_view(&self) -> Option<MethodRouter>;
}

/// A view backed by an axum method router.
#[derive(Clone)]
pub struct HandlerView {
    class_name: String,
    handler: MethodRouter,
}

impl HandlerView {
    /// Creates a view named `class_name` served by `handler`.
    pub fn new(class_name: &str, handler: MethodRouter) -> Self {
        Self {
            class_name: class_name.to_string(),
            handler,
        }
    }
}

impl ViewClass for HandlerView {
    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn as_view(&self) -> Option<MethodRouter> {
        Some(self.handler.clone())
    }
}

impl fmt::Debug for HandlerView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerView")
            .field("class_name", &self.class_name)
            .finish()
    }
}
