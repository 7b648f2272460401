//! Ordered route tables and their conversion into an axum router.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use axum::Router;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::MethodRouter;
use percent_encoding::percent_decode_str;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tower::ServiceExt;
use tracing::{debug, warn};

use super::pattern::RoutePattern;
use crate::error::AppError;
use crate::result::AppResult;

/// Named groups captured by a regex route, inserted into request extensions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathCaptures(pub HashMap<String, String>);

impl PathCaptures {
    /// Value of a named group.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

/// One routing entry.
#[derive(Clone)]
pub struct Route {
    /// Path pattern.
    pub pattern: RoutePattern,
    /// Optional name used for reversing.
    pub name: Option<String>,
    /// Request handler.
    pub handler: MethodRouter,
}

impl Route {
    /// An unnamed literal route.
    pub fn new(path: &str, handler: MethodRouter) -> Self {
        Self {
            pattern: RoutePattern::literal(path),
            name: None,
            handler,
        }
    }

    /// An unnamed regex route.
    pub fn regex(pattern: &str, handler: MethodRouter) -> AppResult<Self> {
        Ok(Self {
            pattern: RoutePattern::regex(pattern)?,
            name: None,
            handler,
        })
    }

    /// Sets the route name.
    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// The pattern source.
    pub fn path(&self) -> &str {
        self.pattern.as_str()
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern.as_str())
            .field("regex", &self.pattern.is_regex())
            .field("name", &self.name)
            .finish()
    }
}

/// Serializable description of a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSummary {
    /// Pattern source.
    pub pattern: String,
    /// Route name, if any.
    pub name: Option<String>,
    /// Whether the pattern is a regular expression.
    pub regex: bool,
}

/// An ordered list of routes.
///
/// Order is significant: when two routes match the same path the earlier
/// one wins.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a route.
    pub fn push(&mut self, route: Route) {
        self.routes.push(route);
    }

    /// Builder form of [`push`](Self::push).
    pub fn with(mut self, route: Route) -> Self {
        self.push(route);
        self
    }

    /// Appends every route of `other`, preserving its order.
    pub fn extend(&mut self, other: RouteTable) {
        self.routes.extend(other.routes);
    }

    /// Appends every route of `other` mounted under `prefix`.
    pub fn include(&mut self, prefix: &str, other: RouteTable) -> AppResult<()> {
        let other = other.prefixed(prefix)?;
        self.extend(other);
        Ok(())
    }

    /// Returns the table with every pattern mounted under `prefix`.
    pub fn prefixed(self, prefix: &str) -> AppResult<Self> {
        let routes = self
            .routes
            .into_iter()
            .map(|route| {
                Ok(Route {
                    pattern: route.pattern.prefixed(prefix)?,
                    ..route
                })
            })
            .collect::<AppResult<Vec<_>>>()?;
        Ok(Self { routes })
    }

    /// Returns the table with every route name qualified as `namespace:name`.
    pub fn namespaced(self, namespace: &str) -> Self {
        let routes = self
            .routes
            .into_iter()
            .map(|mut route| {
                route.name = route.name.map(|name| format!("{namespace}:{name}"));
                route
            })
            .collect();
        Self { routes }
    }

    /// Wraps every handler, e.g. to add a middleware layer.
    pub fn map_handlers(self, f: impl Fn(MethodRouter) -> MethodRouter) -> Self {
        let routes = self
            .routes
            .into_iter()
            .map(|route| Route {
                handler: f(route.handler),
                ..route
            })
            .collect();
        Self { routes }
    }

    /// Keeps only routes for which `keep` returns true.
    pub fn retain(&mut self, keep: impl FnMut(&Route) -> bool) {
        self.routes.retain(keep);
    }

    /// Number of routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Routes in order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// First route with the given name.
    pub fn find(&self, name: &str) -> Option<&Route> {
        self.routes
            .iter()
            .find(|route| route.name.as_deref() == Some(name))
    }

    /// Route names in order, skipping unnamed routes.
    pub fn names(&self) -> Vec<&str> {
        self.routes
            .iter()
            .filter_map(|route| route.name.as_deref())
            .collect()
    }

    /// Builds the URL of a named literal route, filling `{param}` segments
    /// from `args` in order.
    ///
    /// Returns `None` for unknown names, regex routes, or a wrong number of
    /// arguments.
    pub fn reverse(&self, name: &str, args: &[&str]) -> Option<String> {
        let route = self.find(name)?;
        let RoutePattern::Literal(path) = &route.pattern else {
            return None;
        };

        let mut url = String::with_capacity(path.len() + 1);
        url.push('/');
        let mut args = args.iter();
        let mut rest = path.as_str();
        while let Some(start) = rest.find('{') {
            let end = rest[start..].find('}')? + start;
            url.push_str(&rest[..start]);
            url.push_str(args.next()?);
            rest = &rest[end + 1..];
        }
        url.push_str(rest);

        if args.next().is_some() {
            return None;
        }
        Some(url)
    }

    /// Serializable summaries in order.
    pub fn summaries(&self) -> Vec<RouteSummary> {
        self.routes
            .iter()
            .map(|route| RouteSummary {
                pattern: route.path().to_string(),
                name: route.name.clone(),
                regex: route.pattern.is_regex(),
            })
            .collect()
    }

    /// Converts the table into an axum router.
    ///
    /// Literal routes are registered directly; when the same literal path
    /// appears twice the first registration wins. Regex routes are tried in
    /// order from the fallback and receive their named groups as
    /// [`PathCaptures`].
    ///
    /// Fails with a configuration error when a literal path is malformed or
    /// names a parameter differently from an earlier route at the same
    /// position, e.g. `contacts/{pk}/` followed by `contacts/{id}/`.
    pub fn into_router(self) -> AppResult<Router> {
        let mut router = Router::new();
        let mut seen = HashSet::new();
        let mut params = HashMap::new();
        let mut regex_routes = Vec::new();

        for route in self.routes {
            match route.pattern {
                RoutePattern::Literal(path) => {
                    let path = format!("/{path}");
                    if !seen.insert(path.clone()) {
                        warn!(path = %path, name = ?route.name, "Shadowed route skipped");
                        continue;
                    }
                    check_literal(&path, &mut params).map_err(|reason| {
                        AppError::configuration(format!(
                            "Invalid route '{path}' ({}): {reason}",
                            route.name.as_deref().unwrap_or("unnamed")
                        ))
                    })?;
                    debug!(path = %path, name = ?route.name, "Route mounted");
                    router = router.route(&path, route.handler);
                }
                RoutePattern::Regex(regex) => {
                    debug!(pattern = %regex.as_str(), name = ?route.name, "Regex route mounted");
                    regex_routes.push((regex, route.handler));
                }
            }
        }

        if regex_routes.is_empty() {
            return Ok(router);
        }

        let regex_routes = Arc::new(regex_routes);
        Ok(router.fallback(move |req: Request| {
            let routes = Arc::clone(&regex_routes);
            async move { dispatch_regex(&routes, req).await }
        }))
    }
}

/// Rejects literal paths the axum router would refuse to insert.
///
/// `params` maps the parameter-normalised prefix of every parameter segment
/// mounted so far to its `{name}`; two routes may not disagree there.
fn check_literal(path: &str, params: &mut HashMap<String, String>) -> Result<(), String> {
    let segments: Vec<&str> = path.split('/').collect();
    let mut shape = String::new();

    for (index, segment) in segments.iter().enumerate() {
        if index > 0 {
            shape.push('/');
        }
        if !segment.contains(['{', '}']) {
            shape.push_str(segment);
            continue;
        }

        let name = segment
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .ok_or_else(|| format!("parameter '{segment}' must span a whole segment"))?;
        let (catch_all, ident) = match name.strip_prefix('*') {
            Some(ident) => (true, ident),
            None => (false, name),
        };
        if !is_identifier(ident) {
            return Err(format!("'{segment}' is not a valid parameter"));
        }
        if catch_all && index + 1 != segments.len() {
            return Err(format!("catch-all '{segment}' must be the last segment"));
        }

        match params.get(&shape) {
            Some(existing) if existing != segment => {
                return Err(format!(
                    "parameter '{segment}' conflicts with '{existing}' at '{shape}'"
                ));
            }
            Some(_) => {}
            None => {
                params.insert(shape.clone(), segment.to_string());
            }
        }
        shape.push_str("{}");
    }
    Ok(())
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

async fn dispatch_regex(routes: &[(Regex, MethodRouter)], mut req: Request) -> Response {
    let path = match percent_decode_str(req.uri().path()).decode_utf8() {
        Ok(path) => path.trim_start_matches('/').to_string(),
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };

    let matched = routes.iter().find_map(|(regex, handler)| {
        let caps = regex.captures(&path)?;
        let captures = regex
            .capture_names()
            .flatten()
            .filter_map(|group| {
                caps.name(group)
                    .map(|m| (group.to_string(), m.as_str().to_string()))
            })
            .collect::<HashMap<_, _>>();
        Some((handler.clone(), captures))
    });

    let Some((handler, captures)) = matched else {
        return StatusCode::NOT_FOUND.into_response();
    };

    req.extensions_mut().insert(PathCaptures(captures));
    match handler.oneshot(req).await {
        Ok(response) => response,
        Err(never) => match never {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::extract::Extension;
    use axum::routing::get;

    fn table() -> RouteTable {
        RouteTable::new()
            .with(Route::new("users/", get(|| async { "list" })).named("user-list"))
            .with(Route::new("users/{pk}/", get(|| async { "detail" })).named("user-detail"))
            .with(
                Route::regex(
                    r"^(?P<app_label>contacts|auth)/$",
                    get(|Extension(caps): Extension<PathCaptures>| async move {
                        caps.get("app_label").unwrap_or_default().to_string()
                    }),
                )
                .unwrap()
                .named("app_list"),
            )
    }

    async fn body_of(router: Router, uri: &str) -> (StatusCode, String) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[test]
    fn test_namespaced_and_prefixed() {
        let mut root = RouteTable::new();
        root.include("api/v1/", table().namespaced("v1")).unwrap();
        assert_eq!(
            root.names(),
            vec!["v1:user-list", "v1:user-detail", "v1:app_list"]
        );
        assert_eq!(root.routes()[0].path(), "api/v1/users/");
        assert_eq!(
            root.routes()[2].path(),
            r"^api/v1/(?P<app_label>contacts|auth)/$"
        );
    }

    #[test]
    fn test_reverse() {
        let table = table();
        assert_eq!(table.reverse("user-list", &[]), Some("/users/".to_string()));
        assert_eq!(
            table.reverse("user-detail", &["42"]),
            Some("/users/42/".to_string())
        );
        assert_eq!(table.reverse("user-detail", &[]), None);
        assert_eq!(table.reverse("user-list", &["extra"]), None);
        assert_eq!(table.reverse("app_list", &["auth"]), None);
        assert_eq!(table.reverse("missing", &[]), None);
    }

    #[tokio::test]
    async fn test_into_router_serves_literal_and_regex_routes() {
        let router = table().into_router().unwrap();
        assert_eq!(
            body_of(router.clone(), "/users/").await,
            (StatusCode::OK, "list".to_string())
        );
        assert_eq!(
            body_of(router.clone(), "/users/7/").await,
            (StatusCode::OK, "detail".to_string())
        );
        assert_eq!(
            body_of(router.clone(), "/contacts/").await,
            (StatusCode::OK, "contacts".to_string())
        );
        assert_eq!(body_of(router, "/other/").await.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_first_literal_registration_wins() {
        let table = RouteTable::new()
            .with(Route::new("schema/", get(|| async { "first" })))
            .with(Route::new("schema/", get(|| async { "second" })));
        assert_eq!(table.len(), 2);
        assert_eq!(
            body_of(table.into_router().unwrap(), "/schema/").await,
            (StatusCode::OK, "first".to_string())
        );
    }

    #[test]
    fn test_conflicting_parameter_names_are_configuration_errors() {
        let err = RouteTable::new()
            .with(Route::new("contacts/{pk}/", get(|| async { "pk" })).named("contacts-detail"))
            .with(Route::new("contacts/{id}/", get(|| async { "id" })).named("contact-view"))
            .into_router()
            .unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Configuration);
        assert!(err.message.contains("/contacts/{id}/"));
        assert!(err.message.contains("contact-view"));

        let err = RouteTable::new()
            .with(Route::new("files/{pk}/", get(|| async { "pk" })))
            .with(Route::new("files/{*rest}", get(|| async { "rest" })))
            .into_router()
            .unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Configuration);
    }

    #[test]
    fn test_malformed_literal_paths_are_configuration_errors() {
        for path in ["x/{oops/", "x/oops}/", "x/{}/", "x/{1st}/", "x/pre{pk}/", "x/{*rest}/"] {
            let err = RouteTable::new()
                .with(Route::new(path, get(|| async { "bad" })))
                .into_router()
                .unwrap_err();
            assert_eq!(err.kind, crate::error::ErrorKind::Configuration, "{path}");
        }
    }

    #[tokio::test]
    async fn test_shared_parameter_names_mount_side_by_side() {
        let router = RouteTable::new()
            .with(Route::new("contacts/{pk}/", get(|| async { "detail" })))
            .with(Route::new("contacts/{pk}/phone-numbers/", get(|| async { "phones" })))
            .with(Route::new("files/{*rest}", get(|| async { "file" })))
            .into_router()
            .unwrap();
        assert_eq!(
            body_of(router.clone(), "/contacts/3/phone-numbers/").await,
            (StatusCode::OK, "phones".to_string())
        );
        assert_eq!(
            body_of(router, "/files/a/b.txt").await,
            (StatusCode::OK, "file".to_string())
        );
    }

    #[tokio::test]
    async fn test_regex_routes_match_the_decoded_path() {
        let router = RouteTable::new()
            .with(
                Route::regex(
                    r"^labels/(?P<label>[^/]+)/$",
                    get(|Extension(caps): Extension<PathCaptures>| async move {
                        caps.get("label").unwrap_or_default().to_string()
                    }),
                )
                .unwrap(),
            )
            .into_router()
            .unwrap();
        assert_eq!(
            body_of(router.clone(), "/labels/caf%C3%A9%20bar/").await,
            (StatusCode::OK, "café bar".to_string())
        );
        assert_eq!(
            body_of(router, "/labels/%FF/").await.0,
            StatusCode::BAD_REQUEST
        );
    }
}
