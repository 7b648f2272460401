//! API schema generation.
//!
//! Each API version serves a `schema/` document describing its routes and
//! a `documentation/` page rendering it. The generator is selected by the
//! `schema_generator` import-string setting.

use std::sync::Arc;

use axum::Json;
use axum::response::Html;
use axum::routing::get;
use serde_json::{Map, Value, json};

use coreplus_core::configs::{CoreplusSettings, DEFAULT_SCHEMA_GENERATOR, ImportRegistry};
use coreplus_core::result::AppResult;
use coreplus_core::routing::{Route, RouteSummary};

/// What a schema document describes.
#[derive(Debug, Clone)]
pub struct SchemaInfo {
    /// Document title.
    pub title: String,
    /// API version name.
    pub version: String,
    /// Absolute path the version is mounted at, e.g. `"/api/v1/"`.
    pub mount_path: String,
}

/// Produces the schema document of one API version.
pub trait SchemaGenerator: Send + Sync {
    fn generate(&self, info: &SchemaInfo, routes: &[RouteSummary]) -> Value;
}

/// OpenAPI 3 document listing every route of the version.
///
/// Literal routes become `paths`; regex routes are listed under
/// `x-regex-routes` since they have no OpenAPI path template.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSchemaGenerator;

impl SchemaGenerator for DefaultSchemaGenerator {
    fn generate(&self, info: &SchemaInfo, routes: &[RouteSummary]) -> Value {
        let mut paths = Map::new();
        let mut regex_routes = Vec::new();

        for route in routes {
            if route.regex {
                regex_routes.push(json!({
                    "pattern": route.pattern,
                    "name": route.name,
                }));
                continue;
            }
            let path = format!("{}{}", info.mount_path, route.pattern);
            paths.entry(path).or_insert_with(|| {
                json!({
                    "x-route-name": route.name,
                })
            });
        }

        json!({
            "openapi": "3.0.3",
            "info": {
                "title": info.title,
                "version": info.version,
            },
            "paths": paths,
            "x-regex-routes": regex_routes,
        })
    }
}

/// Makes the default generator importable under its symbol path.
pub fn register_default(imports: &ImportRegistry) {
    let generator: Arc<dyn SchemaGenerator> = Arc::new(DefaultSchemaGenerator);
    imports.register(DEFAULT_SCHEMA_GENERATOR, generator);
}

/// Resolves the configured generator.
pub fn configured_generator(settings: &CoreplusSettings) -> AppResult<Arc<dyn SchemaGenerator>> {
    settings.import::<Arc<dyn SchemaGenerator>>("schema_generator")
}

/// The `schema/` route serving a pre-generated document.
pub fn schema_route(document: Value) -> Route {
    let document = Arc::new(document);
    Route::new(
        "schema/",
        get(move || {
            let document = Arc::clone(&document);
            async move { Json(document.as_ref().clone()) }
        }),
    )
    .named("schema")
}

/// The `documentation/` route rendering the sibling `schema/` document.
pub fn documentation_route(title: &str) -> Route {
    let page = Html(format!(
        "<!DOCTYPE html>\n<html>\n<head><title>{title}</title></head>\n<body>\n\
         <redoc spec-url=\"../schema/\"></redoc>\n\
         <script src=\"https://cdn.redoc.ly/redoc/latest/bundles/redoc.standalone.js\"></script>\n\
         </body>\n</html>\n"
    ));
    Route::new("documentation/", get(move || async move { page })).named("redoc")
}

#[cfg(test)]
mod tests {
    use super::*;
    use coreplus_core::error::ErrorKind;
    use serde_json::Map as JsonMap;

    fn summary(pattern: &str, name: Option<&str>, regex: bool) -> RouteSummary {
        RouteSummary {
            pattern: pattern.to_string(),
            name: name.map(str::to_string),
            regex,
        }
    }

    #[test]
    fn test_default_generator_lists_routes() {
        let info = SchemaInfo {
            title: "Platform Administration".to_string(),
            version: "v1".to_string(),
            mount_path: "/api/v1/".to_string(),
        };
        let doc = DefaultSchemaGenerator.generate(
            &info,
            &[
                summary("contacts/", Some("contacts-list"), false),
                summary("contacts/{pk}/", Some("contacts-detail"), false),
                summary(r"^tags/(?P<slug>[-\w]+)/$", None, true),
            ],
        );

        assert_eq!(doc["info"]["version"], "v1");
        assert_eq!(
            doc["paths"]["/api/v1/contacts/{pk}/"]["x-route-name"],
            "contacts-detail"
        );
        assert_eq!(doc["x-regex-routes"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn test_configured_generator_resolves_default() {
        let settings = CoreplusSettings::new(JsonMap::new());
        register_default(settings.imports());
        assert!(configured_generator(&settings).is_ok());
    }

    #[test]
    fn test_unknown_generator_is_configuration_error() {
        let mut user = JsonMap::new();
        user.insert(
            "schema_generator".to_string(),
            Value::from("missing::Generator"),
        );
        let settings = CoreplusSettings::new(user);
        register_default(settings.imports());

        let err = match configured_generator(&settings) {
            Ok(_) => panic!("expected an import failure"),
            Err(err) => err,
        };
        assert_eq!(err.kind, ErrorKind::Configuration);
        assert!(err.message.contains("missing::Generator"));
    }
}
