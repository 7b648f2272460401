//! Convenience macros for hook modules.

/// Wraps a contributor function, recording the calling module and the
/// function name for introspection.
///
/// # Example
/// ```rust,ignore
/// fn contacts_viewset(_ctx: &HookContext) -> HookValue { ... }
///
/// hooks.register(API_V1_VIEWSET_HOOK, contributor!(contacts_viewset)).await?;
/// hooks
///     .with_priority(-10)
///     .register(API_V1_VIEW_HOOK, contributor!(search_view, doc: "Full-text search."))
///     .await?;
/// ```
#[macro_export]
macro_rules! contributor {
    ($func:ident) => {
        $crate::registry::Contributor::new(module_path!(), stringify!($func), $func)
    };
    ($func:ident, doc: $doc:expr) => {
        $crate::registry::Contributor::new(module_path!(), stringify!($func), $func)
            .with_documentation($doc)
    };
}
