//! The contacts `corehooks` module.

use std::sync::Arc;

use async_trait::async_trait;
use axum::Json;
use axum::routing::get;
use serde_json::json;
use tracing::info;

use coreplus_core::result::AppResult;
use coreplus_hooks::definitions::{
    API_V1_URL_PATTERNS, API_V1_VIEW_HOOK, API_V1_VIEWSET_HOOK, API_V2_VIEWSET_HOOK,
    REGISTER_ADMIN_VIEW,
};
use coreplus_hooks::{
    AdminHandler, AdminViewRegistration, ApiViewRegistration, Contributor, HookContext,
    HookDirectory, HookModule, HookValue, UrlInclude, ViewSetRegistration, contributor,
};

use crate::store::ContactStore;
use crate::{admin, api};

/// Contributions of the contacts app.
pub struct ContactsHooks {
    store: Arc<ContactStore>,
}

impl ContactsHooks {
    pub fn new(store: Arc<ContactStore>) -> Self {
        Self { store }
    }
}

/// Static page describing the contacts admin.
fn contacts_about(_ctx: &HookContext) -> HookValue {
    HookValue::AdminView(AdminViewRegistration::new(
        "contacts/about/",
        AdminHandler::Function(get(|| async {
            Json(json!({
                "app": "contacts",
                "import_url": "import/",
            }))
        })),
        "contacts_about",
    ))
}

#[async_trait]
impl HookModule for ContactsHooks {
    async fn register(&self, hooks: &HookDirectory) -> AppResult<()> {
        let store = Arc::clone(&self.store);
        hooks
            .register(
                [API_V1_VIEWSET_HOOK, API_V2_VIEWSET_HOOK],
                Contributor::new(module_path!(), "contacts_viewset", move |_| {
                    HookValue::ViewSet(
                        ViewSetRegistration::new("contacts", api::contact_viewset(&store))
                            .with_basename("contact"),
                    )
                })
                .with_documentation("Contact list, detail and phone numbers."),
            )
            .await?;

        let store = Arc::clone(&self.store);
        hooks
            .register(
                API_V1_VIEW_HOOK,
                Contributor::new(module_path!(), "contacts_search", move |_| {
                    HookValue::ApiView(ApiViewRegistration::new(
                        Arc::new(api::contact_search_view(&store)),
                        "search/contacts/",
                    ))
                }),
            )
            .await?;

        let store = Arc::clone(&self.store);
        hooks
            .register(
                API_V1_URL_PATTERNS,
                Contributor::new(module_path!(), "contacts_export", move |_| {
                    HookValue::UrlInclude(UrlInclude::new(
                        "contacts-export/",
                        api::export_urls(&store),
                    ))
                }),
            )
            .await?;

        let store = Arc::clone(&self.store);
        hooks
            .with_priority(-10)
            .register(
                REGISTER_ADMIN_VIEW,
                Contributor::new(module_path!(), "contacts_import", move |_| {
                    HookValue::AdminView(admin::import_view(&store))
                })
                .with_documentation("Bulk import of contacts."),
            )
            .await?;

        hooks
            .register(
                REGISTER_ADMIN_VIEW,
                contributor!(contacts_about, doc: "Describes the contacts admin."),
            )
            .await?;

        info!(app = "contacts", "Contacts hooks registered");
        Ok(())
    }
}
