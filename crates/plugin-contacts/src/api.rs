//! REST endpoints for contacts.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::get;

use coreplus_core::result::AppResult;
use coreplus_core::routing::{HandlerView, Route, RouteTable, ViewSet, ViewSetAction};

use crate::store::{Contact, ContactStore, NewContact};

/// `contacts/` viewset: list and create, retrieve, a `count` collection
/// action and a `phone-numbers` member action.
pub fn contact_viewset(store: &Arc<ContactStore>) -> ViewSet {
    let list = {
        let read = Arc::clone(store);
        let write = Arc::clone(store);
        get(move || {
            let store = Arc::clone(&read);
            async move { Json(store.list().await) }
        })
        .post(move |Json(contact): Json<NewContact>| {
            let store = Arc::clone(&write);
            async move { create(&store, contact).await }
        })
    };

    let detail = {
        let store = Arc::clone(store);
        get(move |Path(pk): Path<u64>| {
            let store = Arc::clone(&store);
            async move { store.get(pk).await.map(Json) }
        })
    };

    let count = {
        let store = Arc::clone(store);
        get(move || {
            let store = Arc::clone(&store);
            async move { Json(HashMap::from([("count", store.count().await)])) }
        })
    };

    let phone_numbers = {
        let store = Arc::clone(store);
        get(move |Path(pk): Path<u64>| {
            let store = Arc::clone(&store);
            async move { store.get(pk).await.map(|contact| Json(contact.phone_numbers)) }
        })
    };

    ViewSet::new("ContactViewSet")
        .with_list(list)
        .with_detail(detail)
        .with_action(ViewSetAction::collection("count", count))
        .with_action(ViewSetAction::member("phone-numbers", phone_numbers))
}

async fn create(store: &ContactStore, contact: NewContact) -> AppResult<(StatusCode, Json<Contact>)> {
    let created = store.create(contact).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `?q=` search over names and emails.
pub fn contact_search_view(store: &Arc<ContactStore>) -> HandlerView {
    let store = Arc::clone(store);
    HandlerView::new(
        "ContactSearch",
        get(move |Query(params): Query<HashMap<String, String>>| {
            let store = Arc::clone(&store);
            async move {
                let query = params.get("q").map(String::as_str).unwrap_or_default();
                Json(store.search(query).await)
            }
        }),
    )
}

/// Routes included under `contacts-export/`.
pub fn export_urls(store: &Arc<ContactStore>) -> RouteTable {
    let store = Arc::clone(store);
    RouteTable::new().with(
        Route::new(
            "",
            get(move || {
                let store = Arc::clone(&store);
                async move {
                    let rows: Vec<[String; 3]> = store
                        .list()
                        .await
                        .into_iter()
                        .map(|contact| {
                            [
                                contact.name,
                                contact.email.unwrap_or_default(),
                                contact.phone_numbers.join(";"),
                            ]
                        })
                        .collect();
                    Json(rows)
                }
            }),
        )
        .named("contacts-export"),
    )
}
