//! Coreplus composition root.
//!
//! Lists the compiled-in applications and builds the application state
//! from configuration. Shared by the server binary and the integration
//! tests.

use std::sync::Arc;

use tracing::info;

use coreplus_api::{AppState, build_state};
use coreplus_core::config::AppConfig;
use coreplus_core::result::AppResult;
use coreplus_hooks::InstalledApp;
use plugin_contacts::ContactsApp;

/// Every application compiled into the server.
pub struct Catalog {
    pub contacts: Arc<ContactsApp>,
}

impl Catalog {
    pub async fn new() -> Self {
        Self {
            contacts: Arc::new(ContactsApp::with_samples().await),
        }
    }

    pub fn apps(&self) -> Vec<Arc<dyn InstalledApp>> {
        vec![Arc::clone(&self.contacts) as Arc<dyn InstalledApp>]
    }
}

/// Builds the state of a server running `config`.
///
/// Installs the configured apps, registers their setting types and the
/// model admins of installed apps. Hook discovery runs later, when the
/// router is built.
pub async fn compose(config: AppConfig) -> AppResult<AppState> {
    let catalog = Catalog::new().await;
    let state = build_state(config, catalog.apps()).await?;

    if state.apps.get_app_config(catalog.contacts.label()).is_some() {
        catalog.contacts.register_admin(&state.admin).await?;
    }

    info!(
        installed = ?state.apps.iter().map(|app| app.label()).collect::<Vec<_>>(),
        "Coreplus composed"
    );
    Ok(state)
}
