//! Hook dispatcher: invokes every contributor of a hook in priority order.
//!
//! Contributors run synchronously and in directory order. Their values are
//! returned as produced; narrowing to the hook's expected shape is left to
//! the consumer so it can report which hook misbehaved.

use std::sync::Arc;

use tracing::debug;

use coreplus_core::result::AppResult;

use crate::definitions::{HookContext, HookValue};
use crate::registry::HookDirectory;

/// Invokes the contributors of a hook.
#[derive(Debug, Clone)]
pub struct HookDispatcher {
    /// Hook directory.
    directory: Arc<HookDirectory>,
}

impl HookDispatcher {
    /// Creates a new hook dispatcher.
    pub fn new(directory: Arc<HookDirectory>) -> Self {
        Self { directory }
    }

    /// The underlying directory.
    pub fn directory(&self) -> &Arc<HookDirectory> {
        &self.directory
    }

    /// Invokes every contributor of `name` with `ctx`.
    pub async fn invoke(&self, name: &str, ctx: &HookContext) -> AppResult<Vec<HookValue>> {
        let contributors = self.directory.get(name).await?;

        if contributors.is_empty() {
            debug!(hook = %name, "No contributors");
            return Ok(Vec::new());
        }

        debug!(
            hook = %name,
            contributor_count = contributors.len(),
            request_id = %ctx.request_id,
            "Dispatching hook"
        );

        Ok(contributors
            .iter()
            .map(|contributor| {
                let value = contributor.call(ctx);
                debug!(
                    hook = %name,
                    function = %contributor.function,
                    value = value.kind(),
                    "Contributor returned"
                );
                value
            })
            .collect())
    }

    /// Invokes `name` with a fresh context and narrows every value with
    /// `narrow`; the first narrowing failure aborts.
    pub async fn collect<T>(
        &self,
        name: &str,
        narrow: impl Fn(HookValue, &str) -> AppResult<T>,
    ) -> AppResult<Vec<T>> {
        let ctx = HookContext::new(name);
        self.invoke(name, &ctx)
            .await?
            .into_iter()
            .map(|value| narrow(value, name))
            .collect()
    }
}
