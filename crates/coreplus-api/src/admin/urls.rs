//! Admin route table.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Extension, Json, Path};
use axum::middleware::from_fn;
use axum::routing::get;
use serde_json::{Map, Value};
use tracing::info;

use coreplus_core::result::AppResult;
use coreplus_core::routing::{PathCaptures, Route, RouteTable};
use coreplus_core::types::Viewer;
use coreplus_hooks::HookValue;
use coreplus_hooks::definitions::REGISTER_ADMIN_VIEW;

use super::site::AdminSite;
use super::views;
use crate::middleware::admin::require_staff;

/// Namespace of every admin route name.
pub const ADMIN_NAMESPACE: &str = "admin";

impl AdminSite {
    /// Builds the admin route table, relative to the admin mount path.
    ///
    /// Contributed `REGISTER_ADMIN_VIEW` routes come first, then the
    /// site-wide views, then each model admin under
    /// `{app_label}/{model_name}/`, then the per-app index. Every handler
    /// requires an active staff viewer and every name is qualified as
    /// `admin:{name}`.
    pub async fn get_urls(self: &Arc<Self>) -> AppResult<RouteTable> {
        let mut table = RouteTable::new();

        let contributed = self
            .dispatcher
            .collect(REGISTER_ADMIN_VIEW, HookValue::expect_admin_view)
            .await?;
        for view in contributed {
            let handler = view.handler.resolve(&view.url_path)?;
            table.push(
                Route::new(view.url_path.trim_start_matches('/'), handler).named(&view.name),
            );
        }

        table.extend(self.site_routes());

        let mut labels: Vec<String> = Vec::new();
        for (meta, model_admin) in self.registered().await {
            table.include(
                &format!("{}/{}/", meta.app_label, meta.model_name),
                model_admin.urls(&meta),
            )?;
            if !labels.contains(&meta.app_label) {
                labels.push(meta.app_label.clone());
            }
        }

        if !labels.is_empty() {
            let alternatives = labels
                .iter()
                .map(|label| regex::escape(label))
                .collect::<Vec<_>>()
                .join("|");
            let site = Arc::clone(self);
            table.push(
                Route::regex(
                    &format!(r"^(?P<app_label>{alternatives})/$"),
                    get(
                        move |Extension(viewer): Extension<Viewer>,
                              Extension(captures): Extension<PathCaptures>| {
                            let site = Arc::clone(&site);
                            async move {
                                let label = captures.get("app_label").unwrap_or_default().to_string();
                                views::app_index(&site, viewer, &label).await
                            }
                        },
                    ),
                )?
                .named("app_list"),
            );
        }

        info!(
            routes = table.len(),
            app_labels = labels.len(),
            "Admin routes assembled"
        );

        Ok(table
            .map_handlers(|handler| handler.layer(from_fn(require_staff)))
            .namespaced(ADMIN_NAMESPACE))
    }

    fn site_routes(self: &Arc<Self>) -> RouteTable {
        let index = {
            let site = Arc::clone(self);
            get(move |Extension(viewer): Extension<Viewer>| {
                let site = Arc::clone(&site);
                async move { views::index(&site, viewer).await }
            })
        };

        let hooks = {
            let site = Arc::clone(self);
            get(move || {
                let site = Arc::clone(&site);
                async move { views::hook_registry(&site).await }
            })
        };

        let settings_index = {
            let site = Arc::clone(self);
            get(move |Extension(viewer): Extension<Viewer>| {
                let site = Arc::clone(&site);
                async move { views::settings_index(&site, viewer).await }
            })
        };

        let settings_edit = {
            let read = Arc::clone(self);
            let write = Arc::clone(self);
            get(
                move |Extension(viewer): Extension<Viewer>,
                      Path(params): Path<HashMap<String, String>>| {
                    let site = Arc::clone(&read);
                    async move { views::settings_edit(&site, viewer, params).await }
                },
            )
            .post(
                move |Extension(viewer): Extension<Viewer>,
                      Path(params): Path<HashMap<String, String>>,
                      Json(fields): Json<Map<String, Value>>| {
                    let site = Arc::clone(&write);
                    async move { views::settings_save(&site, viewer, params, fields).await }
                },
            )
        };

        RouteTable::new()
            .with(Route::new("", index).named("index"))
            .with(Route::new("hooks/", hooks).named("coreplus_hooks"))
            .with(Route::new("settings/", settings_index).named("settings"))
            .with(
                Route::new("settings/{app_name}/{model_name}/", settings_edit)
                    .named("settings_edit"),
            )
    }
}
