//! The contacts application.

use std::sync::Arc;

use coreplus_api::admin::AdminSite;
use coreplus_core::result::AppResult;
use coreplus_core::types::ModelMeta;
use coreplus_hooks::{HookModule, InstalledApp};

use crate::hooks::ContactsHooks;
use crate::models;
use crate::store::{ContactStore, NewContact};

/// Name of the hook module the contacts app provides.
pub const HOOK_MODULE: &str = "corehooks";

/// Contacts address book.
#[derive(Debug, Clone)]
pub struct ContactsApp {
    store: Arc<ContactStore>,
}

impl ContactsApp {
    pub fn new(store: Arc<ContactStore>) -> Self {
        Self { store }
    }

    /// An app over a store seeded with a few sample contacts.
    pub async fn with_samples() -> Self {
        let samples = [
            ("Ada Lovelace", "ada@example.com", "+44 20 7946 0000"),
            ("Grace Hopper", "grace@example.com", "+1 202 555 0100"),
        ]
        .into_iter()
        .map(|(name, email, phone)| NewContact {
            name: name.to_string(),
            email: Some(email.to_string()),
            phone_numbers: vec![phone.to_string()],
        })
        .collect();
        Self::new(Arc::new(ContactStore::seeded(samples).await))
    }

    pub fn store(&self) -> &Arc<ContactStore> {
        &self.store
    }

    /// Registers the contacts models with `site`.
    pub async fn register_admin(&self, site: &AdminSite) -> AppResult<()> {
        crate::admin::register_admin(site, &self.store).await
    }
}

impl InstalledApp for ContactsApp {
    fn name(&self) -> &str {
        "coreplus.contacts"
    }

    fn label(&self) -> &str {
        models::APP_LABEL
    }

    fn icon(&self) -> Option<&str> {
        Some("contacts-outline")
    }

    fn models(&self) -> Vec<ModelMeta> {
        models::all()
    }

    fn setting_types(&self) -> Vec<ModelMeta> {
        vec![models::contact_settings()]
    }

    fn hook_module(&self, module_name: &str) -> Option<Arc<dyn HookModule>> {
        (module_name == HOOK_MODULE).then(|| {
            Arc::new(ContactsHooks::new(Arc::clone(&self.store))) as Arc<dyn HookModule>
        })
    }
}
