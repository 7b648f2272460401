//! Admin page handlers.
//!
//! Pages render as JSON documents carrying the same context the admin
//! templates would receive.

use std::collections::HashMap;

use axum::Json;
use serde_json::{Map, Value};
use tracing::{info, warn};

use coreplus_core::error::AppError;
use coreplus_core::result::AppResult;
use coreplus_core::types::model::{capfirst, title_case};
use coreplus_core::types::{ModelMeta, Viewer};
use coreplus_settings::user_can_edit_setting_type;

use super::site::AdminSite;
use crate::dto::response::{
    AdminIndexResponse, AppIndexResponse, HookRegistryResponse, SettingEditResponse,
    SettingsIndexResponse,
};

/// Title of the hook registry page.
pub const HOOK_REGISTRY_TITLE: &str = "Coreplus Hooks Registry";

pub async fn index(site: &AdminSite, viewer: Viewer) -> AppResult<Json<AdminIndexResponse>> {
    Ok(Json(AdminIndexResponse {
        title: site.settings.index_title()?,
        site: site.each_context()?,
        app_list: site.get_app_list(&viewer).await?,
        settings_menu: site.settings_registry.menu_items(&viewer).await?,
    }))
}

pub async fn app_index(
    site: &AdminSite,
    viewer: Viewer,
    app_label: &str,
) -> AppResult<Json<AppIndexResponse>> {
    site.app_index(&viewer, app_label).await.map(Json)
}

/// Every hook and its contributors in invocation order.
pub async fn hook_registry(site: &AdminSite) -> AppResult<Json<HookRegistryResponse>> {
    Ok(Json(HookRegistryResponse {
        title: HOOK_REGISTRY_TITLE.to_string(),
        site: site.each_context()?,
        hook_list: site.dispatcher.directory().describe().await?,
    }))
}

pub async fn settings_index(
    site: &AdminSite,
    viewer: Viewer,
) -> AppResult<Json<SettingsIndexResponse>> {
    if !site
        .settings_registry
        .user_can_edit_any_settings(&viewer)
        .await?
    {
        return Err(AppError::authorization(
            "You don't have permission to edit any settings",
        ));
    }

    Ok(Json(SettingsIndexResponse {
        title: "Settings".to_string(),
        items: site.settings_registry.menu_items(&viewer).await?,
    }))
}

/// Resolves the setting type named by the URL and checks the viewer may
/// edit it.
async fn editable_setting(
    site: &AdminSite,
    viewer: &Viewer,
    params: &HashMap<String, String>,
) -> AppResult<ModelMeta> {
    let param = |key: &str| {
        params
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| AppError::validation(format!("Missing path parameter '{key}'")))
    };
    let app_name = param("app_name")?;
    let model_name = param("model_name")?;

    let meta = site
        .settings_registry
        .lookup(app_name, model_name)
        .await?
        .ok_or_else(|| AppError::not_found(format!("No setting type '{app_name}.{model_name}'")))?;

    if !user_can_edit_setting_type(viewer, &meta) {
        warn!(
            username = %viewer.username,
            model = %meta.label(),
            "Setting edit denied"
        );
        return Err(AppError::authorization(format!(
            "You don't have permission to edit {}",
            meta.verbose_name
        )));
    }
    Ok(meta)
}

fn edit_page(meta: ModelMeta, values: Map<String, Value>) -> SettingEditResponse {
    SettingEditResponse {
        title: title_case(&meta.verbose_name_plural),
        setting_type_name: capfirst(&meta.verbose_name),
        model: meta,
        values,
    }
}

pub async fn settings_edit(
    site: &AdminSite,
    viewer: Viewer,
    params: HashMap<String, String>,
) -> AppResult<Json<SettingEditResponse>> {
    let meta = editable_setting(site, &viewer, &params).await?;
    let values = site.settings_registry.value_of(&meta);
    Ok(Json(edit_page(meta, values)))
}

pub async fn settings_save(
    site: &AdminSite,
    viewer: Viewer,
    params: HashMap<String, String>,
    fields: Map<String, Value>,
) -> AppResult<Json<SettingEditResponse>> {
    let meta = editable_setting(site, &viewer, &params).await?;
    let values = site.settings_registry.save(&meta, fields);
    info!(
        username = %viewer.username,
        model = %meta.label(),
        "{} updated",
        capfirst(&meta.verbose_name)
    );
    Ok(Json(edit_page(meta, values)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use coreplus_core::error::ErrorKind;
    use serde_json::json;

    use crate::admin::site::tests::populated_site;

    fn params(app_name: &str, model_name: &str) -> HashMap<String, String> {
        HashMap::from([
            ("app_name".to_string(), app_name.to_string()),
            ("model_name".to_string(), model_name.to_string()),
        ])
    }

    #[tokio::test]
    async fn test_index_lists_apps_and_settings_menu() {
        let site = populated_site(Map::new()).await;
        site.settings_registry
            .register(ModelMeta::new("contacts", "PhoneNumber"))
            .await
            .unwrap();

        let Json(page) = index(&site, Viewer::new("root").superuser()).await.unwrap();
        assert_eq!(page.title, "Platform Administration");
        assert_eq!(page.app_list.len(), 2);
        assert_eq!(page.settings_menu.len(), 1);
        assert_eq!(page.settings_menu[0].url, "/admin/settings/contacts/phonenumber/");
    }

    #[tokio::test]
    async fn test_hook_registry_page() {
        let site = populated_site(Map::new()).await;
        site.settings_registry
            .register(ModelMeta::new("contacts", "PhoneNumber"))
            .await
            .unwrap();

        let Json(page) = hook_registry(&site).await.unwrap();
        assert_eq!(page.title, HOOK_REGISTRY_TITLE);
        assert_eq!(page.hook_list.len(), 1);
        assert_eq!(page.hook_list[0].hook, "REGISTER_SETTINGS_MENU_ITEM");
    }

    #[tokio::test]
    async fn test_settings_index_requires_some_permission() {
        let site = populated_site(Map::new()).await;
        site.settings_registry
            .register(ModelMeta::new("contacts", "PhoneNumber"))
            .await
            .unwrap();

        let err = settings_index(&site, Viewer::new("ada").staff())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        let editor = Viewer::new("ada")
            .staff()
            .with_perm("contacts.change_phonenumber");
        let Json(page) = settings_index(&site, editor).await.unwrap();
        assert_eq!(page.items.len(), 1);
    }

    #[tokio::test]
    async fn test_settings_edit_and_save() {
        let site = populated_site(Map::new()).await;
        site.settings_registry
            .register(ModelMeta::new("contacts", "PhoneNumber"))
            .await
            .unwrap();
        let editor = Viewer::new("ada")
            .staff()
            .with_perm("contacts.change_phonenumber");

        let Json(page) = settings_edit(&site, editor.clone(), params("contacts", "PHONENUMBER"))
            .await
            .unwrap();
        assert_eq!(page.title, "Phone Numbers");
        assert_eq!(page.setting_type_name, "Phone number");
        assert!(page.values.is_empty());

        let mut fields = Map::new();
        fields.insert("default_country".to_string(), json!("ID"));
        let Json(page) = settings_save(&site, editor, params("contacts", "phonenumber"), fields)
            .await
            .unwrap();
        assert_eq!(page.values["default_country"], "ID");
    }

    #[tokio::test]
    async fn test_settings_edit_not_found_and_forbidden() {
        let site = populated_site(Map::new()).await;
        site.settings_registry
            .register(ModelMeta::new("contacts", "PhoneNumber"))
            .await
            .unwrap();

        // Installed model that was never registered as a setting type.
        let err = settings_edit(
            &site,
            Viewer::new("root").superuser(),
            params("contacts", "contact"),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);

        let err = settings_edit(
            &site,
            Viewer::new("ada").staff(),
            params("contacts", "phonenumber"),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
    }
}
