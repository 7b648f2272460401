//! Admin integration for contacts.

use std::sync::Arc;

use axum::Json;
use axum::http::StatusCode;
use axum::routing::get;
use serde::Serialize;

use coreplus_api::admin::{AdminSite, DefaultModelAdmin, ModelAdmin};
use coreplus_core::result::AppResult;
use coreplus_core::routing::{Route, RouteTable};
use coreplus_core::types::ModelMeta;
use coreplus_hooks::{AdminHandler, AdminViewRegistration};

use crate::models;
use crate::store::{Contact, ContactStore, NewContact};

/// Change list and add form of the `Contact` model.
#[derive(Debug)]
pub struct ContactAdmin {
    store: Arc<ContactStore>,
}

impl ContactAdmin {
    pub fn new(store: Arc<ContactStore>) -> Self {
        Self { store }
    }
}

#[derive(Debug, Serialize)]
struct ChangeList {
    title: String,
    count: usize,
    results: Vec<Contact>,
}

impl ModelAdmin for ContactAdmin {
    fn urls(&self, meta: &ModelMeta) -> RouteTable {
        let changelist = {
            let store = Arc::clone(&self.store);
            let title = format!("Select {} to change", meta.verbose_name);
            get(move || {
                let store = Arc::clone(&store);
                let title = title.clone();
                async move {
                    let results = store.list().await;
                    Json(ChangeList {
                        title,
                        count: results.len(),
                        results,
                    })
                }
            })
        };

        let add = {
            let store = Arc::clone(&self.store);
            get(|| async { Json(NewContact::default()) }).post(
                move |Json(contact): Json<NewContact>| {
                    let store = Arc::clone(&store);
                    async move {
                        store
                            .create(contact)
                            .await
                            .map(|created| (StatusCode::CREATED, Json(created)))
                    }
                },
            )
        };

        let prefix = format!("{}_{}", meta.app_label, meta.model_name);
        RouteTable::new()
            .with(Route::new("", changelist).named(&format!("{prefix}_changelist")))
            .with(Route::new("add/", add).named(&format!("{prefix}_add")))
    }
}

/// `contacts/import/`: bulk-creates the posted contacts.
pub fn import_view(store: &Arc<ContactStore>) -> AdminViewRegistration {
    let store = Arc::clone(store);
    let handler = axum::routing::post(move |Json(contacts): Json<Vec<NewContact>>| {
        let store = Arc::clone(&store);
        async move { import(&store, contacts).await }
    });
    AdminViewRegistration::new(
        "contacts/import/",
        AdminHandler::Function(handler),
        "contacts_import",
    )
}

async fn import(store: &ContactStore, contacts: Vec<NewContact>) -> AppResult<Json<Vec<Contact>>> {
    store.import(contacts).await.map(Json)
}

/// Registers the contacts models with the admin site.
pub async fn register_admin(site: &AdminSite, store: &Arc<ContactStore>) -> AppResult<()> {
    site.register(
        models::contact(),
        Arc::new(ContactAdmin::new(Arc::clone(store))),
    )
    .await?;
    site.register(models::phone_number(), Arc::new(DefaultModelAdmin))
        .await?;
    Ok(())
}
