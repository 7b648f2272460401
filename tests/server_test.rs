//! End-to-end tests of the composed server: the contacts app installed
//! behind the REST API and the admin site.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use coreplus::compose;
use coreplus_api::build_app;
use coreplus_core::config::AppConfig;
use coreplus_core::config::auth::AccountConfig;

const REMOTE_USER: &str = "x-remote-user";

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.hooks.installed_apps = vec!["coreplus.contacts".to_string()];
    config.auth.users.insert(
        "root".to_string(),
        AccountConfig {
            is_active: true,
            is_staff: true,
            is_superuser: true,
            permissions: Vec::new(),
        },
    );
    config.auth.users.insert(
        "editor".to_string(),
        AccountConfig {
            is_active: true,
            is_staff: true,
            is_superuser: false,
            permissions: vec!["contacts.view_contact".to_string()],
        },
    );
    config
}

async fn test_app() -> Router {
    let state = compose(test_config()).await.unwrap();
    build_app(&state).await.unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn get_as(uri: &str, user: &str) -> Request<Body> {
    Request::get(uri)
        .header(REMOTE_USER, user)
        .body(Body::empty())
        .unwrap()
}

fn post_as(uri: &str, user: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(REMOTE_USER, user)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = test_app().await;
    let (status, json) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "ok");
}

#[tokio::test]
async fn test_contacts_viewset_on_both_versions() {
    let app = test_app().await;

    let (status, json) = send(&app, get("/api/v1/contacts/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 2);

    let (status, json) = send(&app, get("/api/v1/contacts/1/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Ada Lovelace");

    let (status, json) = send(&app, get("/api/v1/contacts/count/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 2);

    let (status, json) = send(&app, get("/api/v1/contacts/2/phone-numbers/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!(["+1 202 555 0100"]));

    let (status, _) = send(&app, get("/api/v1/contacts/99/")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = send(&app, get("/api/v2/contacts/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_api_root_lists_viewsets() {
    let app = test_app().await;
    let (status, json) = send(&app, get("/api/v1/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["contacts"], "contacts/");
}

#[tokio::test]
async fn test_contributed_api_view_and_include() {
    let app = test_app().await;

    let (status, json) = send(&app, get("/api/v1/search/contacts/?q=grace")).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|contact| contact["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Grace Hopper".to_string()]);

    let (status, json) = send(&app, get("/api/v1/contacts-export/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json[0][0], "Ada Lovelace");

    // Search and export are only contributed to the first version.
    let (status, _) = send(&app, get("/api/v2/search/contacts/")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_schema_describes_contributed_routes() {
    let app = test_app().await;
    let (status, json) = send(&app, get("/api/v1/schema/")).await;
    assert_eq!(status, StatusCode::OK);
    let paths = json["paths"].as_object().unwrap();
    assert!(paths.keys().any(|path| path.contains("contacts")));
}

#[tokio::test]
async fn test_admin_requires_staff() {
    let app = test_app().await;

    let (status, _) = send(&app, get("/admin/")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, get_as("/admin/", "stranger")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, json) = send(&app, get_as("/admin/", "root")).await;
    assert_eq!(status, StatusCode::OK);
    let labels: Vec<_> = json["app_list"]
        .as_array()
        .unwrap()
        .iter()
        .map(|app| app["app_label"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(labels, vec!["contacts".to_string()]);
}

#[tokio::test]
async fn test_admin_app_index_and_model_urls() {
    let app = test_app().await;

    let (status, json) = send(&app, get_as("/admin/contacts/", "root")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["title"], "Contacts Administration");
    let models = json["app_list"][0]["models"].as_array().unwrap();
    let contact = models
        .iter()
        .find(|model| model["object_name"] == "Contact")
        .unwrap();
    assert_eq!(contact["admin_url"], "/admin/contacts/contact/");
    assert_eq!(contact["add_url"], "/admin/contacts/contact/add/");

    let (status, json) = send(&app, get_as("/admin/contacts/contact/", "root")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json.is_object());

    let (status, _) = send(&app, get_as("/admin/unknown/", "root")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_view_only_permissions() {
    let app = test_app().await;
    let (status, json) = send(&app, get_as("/admin/", "editor")).await;
    assert_eq!(status, StatusCode::OK);
    let models = json["app_list"][0]["models"].as_array().unwrap();
    assert_eq!(models.len(), 1);
    assert_eq!(models[0]["object_name"], "Contact");
    assert_eq!(models[0]["view_only"], true);
}

#[tokio::test]
async fn test_admin_hook_registry() {
    let app = test_app().await;
    let (status, json) = send(&app, get_as("/admin/hooks/", "root")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["title"], "Coreplus Hooks Registry");
    let hooks: Vec<_> = json["hook_list"]
        .as_array()
        .unwrap()
        .iter()
        .map(|hook| hook["hook"].as_str().unwrap().to_string())
        .collect();
    assert!(hooks.contains(&"API_V1_VIEWSET_HOOK".to_string()));
    assert!(hooks.contains(&"REGISTER_ADMIN_VIEW".to_string()));
}

#[tokio::test]
async fn test_admin_settings_edit_and_save() {
    let app = test_app().await;
    let uri = "/admin/settings/contacts/contactsettings/";

    let (status, json) = send(&app, get_as(uri, "root")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["title"], "Contact Settings");
    assert_eq!(json["setting_type_name"], "Contact settings");

    let (status, json) = send(&app, post_as(uri, "root", json!({"page_size": 50}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["values"]["page_size"], 50);

    let (_, json) = send(&app, get_as(uri, "root")).await;
    assert_eq!(json["values"]["page_size"], 50);

    let (status, _) = send(&app, get_as(uri, "editor")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, get_as("/admin/settings/contacts/missing/", "root")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_contacts_import() {
    let app = test_app().await;

    let (status, json) = send(
        &app,
        post_as(
            "/admin/contacts/import/",
            "root",
            json!([{"name": "Katherine Johnson", "email": "kj@example.com"}]),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json[0]["id"], 3);

    let (_, json) = send(&app, get("/api/v1/contacts/count/")).await;
    assert_eq!(json["count"], 3);

    let (status, _) = send(
        &app,
        post_as("/admin/contacts/import/", "root", json!([{"name": ""}])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
