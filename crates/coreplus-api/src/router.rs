//! Viewset router: expands viewset registrations into concrete routes.
//!
//! Routes are generated per registration in this order, with these names:
//!
//! | Path | Name |
//! |---|---|
//! | `{prefix}/` | `{basename}-list` |
//! | `{prefix}/{url_path}/` | `{basename}-{url_name}` (collection actions) |
//! | `{prefix}/{pk}/` | `{basename}-detail` |
//! | `{prefix}/{pk}/{url_path}/` | `{basename}-{url_name}` (member actions) |
//!
//! An `api-root` route at `""` listing every registered prefix comes first.

use std::collections::{BTreeMap, HashMap};

use axum::Json;
use axum::routing::get;
use tracing::{debug, info};

use coreplus_core::configs::CoreplusSettings;
use coreplus_core::error::AppError;
use coreplus_core::result::AppResult;
use coreplus_core::routing::{Route, RouteTable};
use coreplus_hooks::ViewSetRegistration;

/// Route-name suffixes removed from the routes generated for a prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteExclusions(HashMap<String, Vec<String>>);

impl RouteExclusions {
    pub fn new(exclusions: HashMap<String, Vec<String>>) -> Self {
        Self(exclusions)
    }

    /// Reads the `route_exclusions` setting.
    pub fn from_settings(settings: &CoreplusSettings) -> AppResult<Self> {
        settings.route_exclusions().map(Self)
    }

    /// Adds excluded suffixes for `prefix`.
    pub fn exclude(mut self, prefix: &str, suffixes: &[&str]) -> Self {
        self.0
            .entry(prefix.to_string())
            .or_default()
            .extend(suffixes.iter().map(|s| s.to_string()));
        self
    }

    /// Whether the route `name` generated for `prefix` is excluded.
    pub fn is_excluded(&self, prefix: &str, name: &str) -> bool {
        self.0
            .get(prefix)
            .is_some_and(|suffixes| suffixes.iter().any(|suffix| name.ends_with(suffix.as_str())))
    }
}

/// Collects viewset registrations and generates their routes.
#[derive(Debug, Clone, Default)]
pub struct ViewSetRouter {
    registry: Vec<(String, ViewSetRegistration)>,
    exclusions: RouteExclusions,
}

impl ViewSetRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_exclusions(mut self, exclusions: RouteExclusions) -> Self {
        self.exclusions = exclusions;
        self
    }

    /// Registers a viewset under its prefix.
    ///
    /// The prefix loses surrounding slashes. Two registrations with the
    /// same basename are a configuration error.
    pub fn register(&mut self, mut registration: ViewSetRegistration) -> AppResult<()> {
        registration.prefix = registration.prefix.trim_matches('/').to_string();
        let basename = registration
            .basename
            .clone()
            .unwrap_or_else(|| registration.viewset.basename());

        if self.registry.iter().any(|(existing, _)| *existing == basename) {
            return Err(AppError::configuration(format!(
                "Router with basename '{basename}' is already registered. \
                 Provide a unique basename for viewset '{}'",
                registration.viewset.name
            )));
        }

        debug!(
            prefix = %registration.prefix,
            basename = %basename,
            "Viewset registered"
        );
        self.registry.push((basename, registration));
        Ok(())
    }

    /// Number of registrations.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Generates the route table.
    pub fn urls(&self) -> RouteTable {
        let mut table = RouteTable::new();
        table.push(self.api_root());

        for (basename, registration) in &self.registry {
            let mut routes = routes_for(basename, registration);
            let before = routes.len();
            routes.retain(|route| {
                route
                    .name
                    .as_deref()
                    .is_none_or(|name| !self.exclusions.is_excluded(&registration.prefix, name))
            });
            if routes.len() != before {
                info!(
                    prefix = %registration.prefix,
                    removed = before - routes.len(),
                    "Excluded generated routes"
                );
            }
            table.extend(routes);
        }

        table
    }

    fn api_root(&self) -> Route {
        let listing: BTreeMap<String, String> = self
            .registry
            .iter()
            .filter(|(_, registration)| registration.viewset.list.is_some())
            .map(|(_, registration)| {
                (
                    registration.prefix.clone(),
                    format!("{}/", registration.prefix),
                )
            })
            .collect();

        Route::new(
            "",
            get(move || {
                let listing = listing.clone();
                async move { Json(listing) }
            }),
        )
        .named("api-root")
    }
}

fn routes_for(basename: &str, registration: &ViewSetRegistration) -> RouteTable {
    let prefix = &registration.prefix;
    let viewset = &registration.viewset;
    let mut table = RouteTable::new();

    if let Some(list) = &viewset.list {
        table.push(Route::new(&format!("{prefix}/"), list.clone()).named(&format!("{basename}-list")));
    }
    for action in viewset.actions.iter().filter(|action| !action.detail) {
        table.push(
            Route::new(&format!("{prefix}/{}/", action.url_path), action.handler.clone())
                .named(&format!("{basename}-{}", action.url_name)),
        );
    }
    if let Some(detail) = &viewset.detail {
        table.push(
            Route::new(&format!("{prefix}/{{pk}}/"), detail.clone())
                .named(&format!("{basename}-detail")),
        );
    }
    for action in viewset.actions.iter().filter(|action| action.detail) {
        table.push(
            Route::new(
                &format!("{prefix}/{{pk}}/{}/", action.url_path),
                action.handler.clone(),
            )
            .named(&format!("{basename}-{}", action.url_name)),
        );
    }

    table
}
