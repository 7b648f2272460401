//! API surface assembly from the hook directory.
//!
//! One API version is assembled from three hooks: a viewset hook feeding
//! the [`ViewSetRouter`], a view hook contributing one-off views, and a
//! urls hook contributing whole route tables. The version table is, in
//! order: schema routes, included tables, router routes, api views.

use axum::routing::MethodRouter;
use tracing::info;

use coreplus_core::config::api::{ApiConfig, ApiVersionConfig};
use coreplus_core::configs::CoreplusSettings;
use coreplus_core::error::AppError;
use coreplus_core::result::AppResult;
use coreplus_core::routing::{Route, RouteTable};
use coreplus_hooks::{ApiViewRegistration, HookDispatcher, HookValue};

use crate::router::{RouteExclusions, ViewSetRouter};
use crate::schema::{self, SchemaInfo};

/// Builds the viewset router from every contributor of `hook`.
pub async fn build_router(
    dispatcher: &HookDispatcher,
    hook: &str,
    exclusions: RouteExclusions,
) -> AppResult<ViewSetRouter> {
    let registrations = dispatcher.collect(hook, HookValue::expect_viewset).await?;

    let mut router = ViewSetRouter::new().with_exclusions(exclusions);
    for registration in registrations {
        router.register(registration)?;
    }
    Ok(router)
}

/// A validated api view descriptor.
struct ApiViewRoute {
    url_path: String,
    name: String,
    regex: bool,
    handler: MethodRouter,
}

fn validate_api_view(hook: &str, registration: ApiViewRegistration) -> AppResult<ApiViewRoute> {
    let view_class = registration.view_class.ok_or_else(|| {
        AppError::configuration(format!("Result of '{hook}' must have a 'view_class'"))
    })?;
    let url_path = registration.url_path.ok_or_else(|| {
        AppError::configuration(format!("Result of '{hook}' must have a 'url_path'"))
    })?;
    let handler = view_class.as_view().ok_or_else(|| {
        AppError::configuration(format!(
            "View class '{}' contributed to '{hook}' cannot dispatch requests",
            view_class.class_name()
        ))
    })?;

    let url_path = if registration.regex {
        match url_path.strip_prefix("^/") {
            Some(rest) => format!("^{rest}"),
            None => url_path,
        }
    } else {
        url_path.trim_start_matches('/').to_string()
    };

    Ok(ApiViewRoute {
        url_path,
        name: registration
            .name
            .unwrap_or_else(|| view_class.class_name().to_lowercase()),
        regex: registration.regex,
        handler,
    })
}

/// Builds one route per contributor of `hook`.
///
/// Every descriptor is validated before any route is constructed, so a
/// malformed contribution never yields a partial table.
pub async fn build_api_views(dispatcher: &HookDispatcher, hook: &str) -> AppResult<RouteTable> {
    let validated = dispatcher
        .collect(hook, |value, hook| {
            validate_api_view(hook, value.expect_api_view(hook)?)
        })
        .await?;

    let mut table = RouteTable::new();
    for view in validated {
        let route = if view.regex {
            Route::regex(&view.url_path, view.handler)?
        } else {
            Route::new(&view.url_path, view.handler)
        };
        table.push(route.named(&view.name));
    }
    Ok(table)
}

/// Mounts the route table of every contributor of `hook` under its path.
pub async fn build_included_urls(dispatcher: &HookDispatcher, hook: &str) -> AppResult<RouteTable> {
    let includes = dispatcher
        .collect(hook, HookValue::expect_url_include)
        .await?;

    let mut table = RouteTable::new();
    for include in includes {
        table.include(include.url_path.trim_start_matches('/'), include.module)?;
    }
    Ok(table)
}

/// Assembles one API version, namespaced by its name.
///
/// `mount_path` is where the version will be served, e.g. `"/api/v1/"`;
/// the schema document lists routes relative to it.
pub async fn build_version_routes(
    dispatcher: &HookDispatcher,
    settings: &CoreplusSettings,
    mount_path: &str,
    version: &ApiVersionConfig,
) -> AppResult<RouteTable> {
    let included = build_included_urls(dispatcher, &version.urls_hook).await?;
    let router = build_router(
        dispatcher,
        &version.viewset_hook,
        RouteExclusions::from_settings(settings)?,
    )
    .await?;
    let views = build_api_views(dispatcher, &version.view_hook).await?;

    let mut body = RouteTable::new();
    body.extend(included);
    body.extend(router.urls());
    body.extend(views);

    let title = settings.site_title()?;
    let info = SchemaInfo {
        title: title.clone(),
        version: version.name.clone(),
        mount_path: mount_path.to_string(),
    };
    let document = schema::configured_generator(settings)?.generate(&info, &body.summaries());

    let mut table = RouteTable::new();
    table.push(schema::schema_route(document));
    table.push(schema::documentation_route(&title));
    table.extend(body);

    info!(
        version = %version.name,
        mount_path = %mount_path,
        routes = table.len(),
        viewsets = router.len(),
        "API version assembled"
    );
    Ok(table.namespaced(&version.name))
}

/// Assembles every configured version, each mounted under
/// `{url_prefix}{version}/`.
pub async fn build_api_routes(
    dispatcher: &HookDispatcher,
    settings: &CoreplusSettings,
    config: &ApiConfig,
) -> AppResult<RouteTable> {
    let api_prefix = config.url_prefix.trim_start_matches('/');

    let mut table = RouteTable::new();
    for version in &config.versions {
        let prefix = format!("{api_prefix}{}/", version.name);
        let routes =
            build_version_routes(dispatcher, settings, &format!("/{prefix}"), version).await?;
        table.include(&prefix, routes)?;
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use coreplus_core::error::ErrorKind;
    use coreplus_core::routing::{HandlerView, RouteTable, ViewClass, ViewSet};
    use coreplus_hooks::definitions::{API_V1_URL_PATTERNS, API_V1_VIEW_HOOK, API_V1_VIEWSET_HOOK};
    use coreplus_hooks::{AppRegistry, Contributor, HookDirectory, UrlInclude, ViewSetRegistration};

    fn dispatcher() -> HookDispatcher {
        HookDispatcher::new(Arc::new(HookDirectory::new(
            Arc::new(AppRegistry::default()),
            "corehooks",
        )))
    }

    fn settings() -> CoreplusSettings {
        let settings = CoreplusSettings::default();
        schema::register_default(settings.imports());
        settings
    }

    async fn contribute(
        dispatcher: &HookDispatcher,
        hook: &str,
        function: &str,
        value: impl Fn() -> HookValue + Send + Sync + 'static,
    ) {
        dispatcher
            .directory()
            .register(hook, Contributor::new(module_path!(), function, move |_| value()))
            .await
            .unwrap();
    }

    fn some_handler() -> Arc<dyn ViewClass> {
        Arc::new(HandlerView::new("SomeHandler", get(|| async { "some" })))
    }

    struct Inert;

    impl ViewClass for Inert {
        fn class_name(&self) -> &str {
            "Inert"
        }

        fn as_view(&self) -> Option<MethodRouter> {
            None
        }
    }

    #[tokio::test]
    async fn test_api_view_defaults_to_lowercase_class_name() {
        let dispatcher = dispatcher();
        contribute(&dispatcher, API_V1_VIEW_HOOK, "some_view", || {
            HookValue::ApiView(ApiViewRegistration::new(some_handler(), "/x/"))
        })
        .await;

        let table = build_api_views(&dispatcher, API_V1_VIEW_HOOK).await.unwrap();
        assert_eq!(table.len(), 1);
        let route = &table.routes()[0];
        assert_eq!(route.name.as_deref(), Some("somehandler"));
        assert!(!route.pattern.is_regex());
        assert_eq!(table.reverse("somehandler", &[]), Some("/x/".to_string()));
    }

    #[tokio::test]
    async fn test_missing_url_path_builds_nothing() {
        let dispatcher = dispatcher();
        contribute(&dispatcher, API_V1_VIEW_HOOK, "good", || {
            HookValue::ApiView(ApiViewRegistration::new(some_handler(), "ok/"))
        })
        .await;
        contribute(&dispatcher, API_V1_VIEW_HOOK, "bad", || {
            HookValue::ApiView(ApiViewRegistration {
                view_class: Some(some_handler()),
                ..ApiViewRegistration::default()
            })
        })
        .await;

        let err = build_api_views(&dispatcher, API_V1_VIEW_HOOK)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
        assert!(err.message.contains("url_path"));
    }

    #[tokio::test]
    async fn test_api_view_shape_and_capability_errors() {
        let dispatcher = dispatcher();
        contribute(&dispatcher, API_V1_VIEW_HOOK, "wrong_shape", || {
            HookValue::Json(Value::Null)
        })
        .await;
        let err = build_api_views(&dispatcher, API_V1_VIEW_HOOK)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidType);

        let dispatcher = self::dispatcher();
        contribute(&dispatcher, API_V1_VIEW_HOOK, "inert", || {
            HookValue::ApiView(ApiViewRegistration::new(Arc::new(Inert), "inert/"))
        })
        .await;
        let err = build_api_views(&dispatcher, API_V1_VIEW_HOOK)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
        assert!(err.message.contains("Inert"));
    }

    #[tokio::test]
    async fn test_regex_api_view() {
        let dispatcher = dispatcher();
        contribute(&dispatcher, API_V1_VIEW_HOOK, "tagged", || {
            HookValue::ApiView(
                ApiViewRegistration::new(some_handler(), r"^/tags/(?P<slug>[-\w]+)/$")
                    .with_name("tag-detail")
                    .as_regex(),
            )
        })
        .await;

        let table = build_api_views(&dispatcher, API_V1_VIEW_HOOK).await.unwrap();
        let route = table.find("tag-detail").unwrap();
        assert!(route.pattern.is_regex());
        assert_eq!(route.path(), r"^tags/(?P<slug>[-\w]+)/$");
    }

    #[tokio::test]
    async fn test_zero_contributors_yield_empty_tables() {
        let dispatcher = dispatcher();
        assert!(
            build_api_views(&dispatcher, API_V1_VIEW_HOOK)
                .await
                .unwrap()
                .is_empty()
        );
        assert!(
            build_included_urls(&dispatcher, API_V1_URL_PATTERNS)
                .await
                .unwrap()
                .is_empty()
        );
        let router = build_router(&dispatcher, API_V1_VIEWSET_HOOK, RouteExclusions::default())
            .await
            .unwrap();
        assert!(router.is_empty());
    }

    #[tokio::test]
    async fn test_included_urls_are_prefixed() {
        let dispatcher = dispatcher();
        contribute(&dispatcher, API_V1_URL_PATTERNS, "reports", || {
            let module = RouteTable::new()
                .with(Route::new("summary/", get(|| async { "summary" })).named("summary"));
            HookValue::UrlInclude(UrlInclude::new("reports/", module))
        })
        .await;

        let table = build_included_urls(&dispatcher, API_V1_URL_PATTERNS)
            .await
            .unwrap();
        assert_eq!(table.reverse("summary", &[]), Some("/reports/summary/".to_string()));
    }

    #[tokio::test]
    async fn test_version_route_order() {
        let dispatcher = dispatcher();
        contribute(&dispatcher, API_V1_VIEW_HOOK, "some_view", || {
            HookValue::ApiView(ApiViewRegistration::new(some_handler(), "x/"))
        })
        .await;
        contribute(&dispatcher, API_V1_VIEWSET_HOOK, "notes", || {
            HookValue::ViewSet(ViewSetRegistration::new(
                "notes",
                ViewSet::new("NoteViewSet").with_list(get(|| async { "[]" })),
            ))
        })
        .await;
        contribute(&dispatcher, API_V1_URL_PATTERNS, "reports", || {
            HookValue::UrlInclude(UrlInclude::new(
                "reports/",
                RouteTable::new().with(Route::new("", get(|| async {})).named("reports")),
            ))
        })
        .await;

        let table = build_version_routes(
            &dispatcher,
            &settings(),
            "/api/v1/",
            &ApiVersionConfig::numbered(1),
        )
        .await
        .unwrap();

        assert_eq!(
            table.names(),
            vec![
                "v1:schema",
                "v1:redoc",
                "v1:reports",
                "v1:api-root",
                "v1:note-list",
                "v1:somehandler",
            ]
        );
    }

    #[tokio::test]
    async fn test_api_routes_serve_each_version() {
        let dispatcher = dispatcher();
        contribute(&dispatcher, API_V1_VIEW_HOOK, "some_view", || {
            HookValue::ApiView(ApiViewRegistration::new(some_handler(), "x/"))
        })
        .await;

        let table = build_api_routes(&dispatcher, &settings(), &ApiConfig::default())
            .await
            .unwrap();
        assert_eq!(
            table.reverse("v1:somehandler", &[]),
            Some("/api/v1/x/".to_string())
        );
        assert!(table.find("v2:somehandler").is_none());
        assert!(table.find("v2:schema").is_some());

        let app = table.into_router().unwrap();
        let response = app
            .clone()
            .oneshot(Request::get("/api/v1/x/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"some");

        let response = app
            .oneshot(Request::get("/api/v1/schema/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let doc: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(doc["paths"]["/api/v1/x/"]["x-route-name"], "somehandler");
    }
}
