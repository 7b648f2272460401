//! Operator-facing description of the hook directory.

use serde::{Deserialize, Serialize};

use coreplus_core::result::AppResult;

use crate::registry::HookDirectory;

/// One contributor as shown in the hook registry view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorDescription {
    /// Priority of the entry.
    pub order: i32,
    pub module: String,
    pub function: String,
    pub documentation: Option<String>,
}

/// A hook and its contributors in priority order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookDescription {
    pub hook: String,
    pub contributors: Vec<ContributorDescription>,
}

impl HookDirectory {
    /// Describes every hook, sorted by hook name, with contributors in
    /// priority order.
    pub async fn describe(&self) -> AppResult<Vec<HookDescription>> {
        let mut hooks: Vec<HookDescription> = self
            .get_all()
            .await?
            .into_iter()
            .map(|(hook, entries)| HookDescription {
                hook,
                contributors: entries
                    .into_iter()
                    .map(|entry| ContributorDescription {
                        order: entry.priority,
                        module: entry.contributor.module,
                        function: entry.contributor.function,
                        documentation: entry.contributor.documentation,
                    })
                    .collect(),
            })
            .collect();

        hooks.sort_by(|a, b| a.hook.cmp(&b.hook));
        Ok(hooks)
    }
}
