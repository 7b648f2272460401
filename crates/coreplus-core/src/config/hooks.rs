//! Hook discovery configuration.

use serde::{Deserialize, Serialize};

/// Which compiled-in applications are installed.
///
/// The order of `installed_apps` is the order hook modules are discovered
/// in, and therefore the registration order used to break priority ties.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HooksConfig {
    /// Application names to install. Empty installs every compiled-in app.
    #[serde(default)]
    pub installed_apps: Vec<String>,
}
