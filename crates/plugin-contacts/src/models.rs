//! Model metadata of the contacts app.

use coreplus_core::types::ModelMeta;

pub const APP_LABEL: &str = "contacts";

pub fn contact() -> ModelMeta {
    ModelMeta::new(APP_LABEL, "Contact").with_icon("card-account-details-outline")
}

pub fn phone_number() -> ModelMeta {
    ModelMeta::new(APP_LABEL, "PhoneNumber").with_icon("phone-outline")
}

/// Site-wide contacts preferences, editable from the settings menu.
pub fn contact_settings() -> ModelMeta {
    ModelMeta::new(APP_LABEL, "ContactSettings")
        .with_verbose_name("contact settings")
        .with_verbose_name_plural("contact settings")
}

pub fn all() -> Vec<ModelMeta> {
    vec![contact(), phone_number(), contact_settings()]
}
