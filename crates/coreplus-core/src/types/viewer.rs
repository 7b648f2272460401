//! The identity an admin page or hook is evaluated for.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// An authenticated (or anonymous) user as seen by permission checks.
///
/// Authentication itself happens upstream; handlers find the `Viewer` in
/// the request extensions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewer {
    /// Username, empty for anonymous viewers.
    pub username: String,
    /// Inactive viewers hold no permissions.
    pub is_active: bool,
    /// Whether the viewer may enter the admin site.
    pub is_staff: bool,
    /// Superusers hold every permission.
    pub is_superuser: bool,
    /// Granted permission codenames (`app_label.action_model`).
    pub permissions: HashSet<String>,
}

impl Viewer {
    /// An active, non-staff viewer without permissions.
    pub fn new(username: &str) -> Self {
        Self {
            username: username.to_string(),
            is_active: true,
            ..Self::default()
        }
    }

    /// An anonymous viewer.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Marks the viewer as staff.
    pub fn staff(mut self) -> Self {
        self.is_staff = true;
        self
    }

    /// Marks the viewer as superuser (implies staff).
    pub fn superuser(mut self) -> Self {
        self.is_staff = true;
        self.is_superuser = true;
        self
    }

    /// Marks the viewer as inactive.
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Grants a permission codename.
    pub fn with_perm(mut self, perm: &str) -> Self {
        self.permissions.insert(perm.to_string());
        self
    }

    /// Whether the viewer holds `perm`.
    pub fn has_perm(&self, perm: &str) -> bool {
        self.is_active && (self.is_superuser || self.permissions.contains(perm))
    }

    /// Whether the viewer holds every permission in `perms`.
    pub fn has_perms<'a>(&self, perms: impl IntoIterator<Item = &'a str>) -> bool {
        perms.into_iter().all(|perm| self.has_perm(perm))
    }

    /// Whether the viewer holds any permission in the `app_label` namespace.
    pub fn has_module_perms(&self, app_label: &str) -> bool {
        if !self.is_active {
            return false;
        }
        if self.is_superuser {
            return true;
        }
        let prefix = format!("{app_label}.");
        self.permissions.iter().any(|perm| perm.starts_with(&prefix))
    }

    /// Whether the viewer may enter the admin site.
    pub fn is_admin(&self) -> bool {
        self.is_active && self.is_staff
    }
}
