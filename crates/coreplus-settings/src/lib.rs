//! # coreplus-settings
//!
//! Registry of setting types editable from the admin. Registering a type
//! also contributes a settings menu entry to the hook directory.

pub mod permissions;
pub mod registry;

pub use permissions::{perm_name, user_can_edit_setting_type};
pub use registry::SettingsRegistry;
