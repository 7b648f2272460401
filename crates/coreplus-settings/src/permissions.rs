//! Permission checks for editing setting types.
//!
//! Editing a setting type needs the `change` permission of its model.

use coreplus_core::result::AppResult;
use coreplus_core::types::{ModelMeta, Viewer};

use crate::registry::SettingsRegistry;

/// `app_label.change_model_name`.
pub fn perm_name(meta: &ModelMeta) -> String {
    meta.perm("change")
}

/// Whether `viewer` may edit settings of type `meta`.
pub fn user_can_edit_setting_type(viewer: &Viewer, meta: &ModelMeta) -> bool {
    viewer.has_perm(&perm_name(meta))
}

impl SettingsRegistry {
    /// Change permissions of every registered setting type.
    pub async fn settings_perm_names(&self) -> AppResult<Vec<String>> {
        Ok(self.models().await?.iter().map(perm_name).collect())
    }

    /// Whether `viewer` may edit at least one registered setting type.
    pub async fn user_can_edit_any_settings(&self, viewer: &Viewer) -> AppResult<bool> {
        Ok(self
            .models()
            .await?
            .iter()
            .any(|meta| user_can_edit_setting_type(viewer, meta)))
    }

    /// Whether `viewer` may edit all of `models`, or every registered
    /// setting type when `models` is `None`.
    pub async fn user_can_edit_settings(
        &self,
        viewer: &Viewer,
        models: Option<&[ModelMeta]>,
    ) -> AppResult<bool> {
        let perms = match models {
            Some(models) => models.iter().map(perm_name).collect(),
            None => self.settings_perm_names().await?,
        };
        Ok(viewer.has_perms(perms.iter().map(String::as_str)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use coreplus_hooks::{AppRegistry, HookDirectory};

    fn registry() -> SettingsRegistry {
        let apps = Arc::new(AppRegistry::default());
        let hooks = Arc::new(HookDirectory::new(Arc::clone(&apps), "corehooks"));
        SettingsRegistry::new(hooks, apps, "/admin/settings/")
    }

    #[test]
    fn test_perm_name() {
        let meta = ModelMeta::new("contacts", "ContactSettings");
        assert_eq!(perm_name(&meta), "contacts.change_contactsettings");
    }

    #[test]
    fn test_superuser_edits_everything() {
        let meta = ModelMeta::new("contacts", "ContactSettings");
        assert!(user_can_edit_setting_type(
            &Viewer::new("root").superuser(),
            &meta
        ));
        assert!(!user_can_edit_setting_type(
            &Viewer::new("root").superuser().inactive(),
            &meta
        ));
    }

    #[tokio::test]
    async fn test_any_and_all_settings() {
        let registry = registry();
        let a = ModelMeta::new("contacts", "ContactSettings");
        let b = ModelMeta::new("branding", "SiteBranding");
        registry.register(a.clone()).await.unwrap();
        registry.register(b.clone()).await.unwrap();

        let viewer = Viewer::new("ops").with_perm(&perm_name(&a));
        assert!(registry.user_can_edit_any_settings(&viewer).await.unwrap());
        assert!(!registry.user_can_edit_settings(&viewer, None).await.unwrap());
        assert!(
            registry
                .user_can_edit_settings(&viewer, Some(std::slice::from_ref(&a)))
                .await
                .unwrap()
        );
        assert_eq!(
            registry.settings_perm_names().await.unwrap(),
            vec![
                "contacts.change_contactsettings".to_string(),
                "branding.change_sitebranding".to_string()
            ]
        );
        assert!(
            !registry
                .user_can_edit_any_settings(&Viewer::new("guest"))
                .await
                .unwrap()
        );
    }
}
