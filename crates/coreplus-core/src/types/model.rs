//! Model metadata: how the host describes a registered type.

use serde::{Deserialize, Serialize};

/// Metadata describing one model type within its namespace (app label).
///
/// Two metadata values describe the same type when their app label and
/// model name match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMeta {
    /// Namespace the model is organized under.
    pub app_label: String,
    /// Lowercase model name.
    pub model_name: String,
    /// Model type name as declared (`"ContactSettings"`).
    pub object_name: String,
    /// Human-readable singular name.
    pub verbose_name: String,
    /// Human-readable plural name.
    pub verbose_name_plural: String,
    /// Explicit icon token, if the model declares one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl ModelMeta {
    /// Describes `object_name` under `app_label`, deriving the remaining names.
    pub fn new(app_label: &str, object_name: &str) -> Self {
        let verbose_name = camel_case_to_spaces(object_name);
        Self {
            app_label: app_label.to_string(),
            model_name: object_name.to_lowercase(),
            object_name: object_name.to_string(),
            verbose_name_plural: format!("{verbose_name}s"),
            verbose_name,
            icon: None,
        }
    }

    /// Overrides the singular verbose name.
    pub fn with_verbose_name(mut self, verbose_name: &str) -> Self {
        self.verbose_name = verbose_name.to_string();
        self
    }

    /// Overrides the plural verbose name.
    pub fn with_verbose_name_plural(mut self, verbose_name_plural: &str) -> Self {
        self.verbose_name_plural = verbose_name_plural.to_string();
        self
    }

    /// Sets an explicit icon token.
    pub fn with_icon(mut self, icon: &str) -> Self {
        self.icon = Some(icon.to_string());
        self
    }

    /// `app_label.ObjectName`.
    pub fn label(&self) -> String {
        format!("{}.{}", self.app_label, self.object_name)
    }

    /// Permission codename for `action` on this model (`contacts.change_contact`).
    pub fn perm(&self, action: &str) -> String {
        format!("{}.{}_{}", self.app_label, action, self.model_name)
    }

    /// Whether this metadata names the given (namespace, name) pair.
    ///
    /// The model name comparison is case-insensitive.
    pub fn matches(&self, app_label: &str, model_name: &str) -> bool {
        self.app_label == app_label && self.model_name == model_name.to_lowercase()
    }
}

impl PartialEq for ModelMeta {
    fn eq(&self, other: &Self) -> bool {
        self.app_label == other.app_label && self.model_name == other.model_name
    }
}

impl Eq for ModelMeta {}

impl std::hash::Hash for ModelMeta {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.app_label.hash(state);
        self.model_name.hash(state);
    }
}

fn camel_case_to_spaces(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 4);
    let mut prev_lower = false;
    for ch in value.chars() {
        if ch.is_uppercase() && prev_lower {
            out.push(' ');
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        out.extend(ch.to_lowercase());
    }
    out
}

/// Title-cases every word (`"e-mail settings"` → `"E-Mail Settings"`).
///
/// A letter is upper-cased when it follows a non-letter and lower-cased
/// otherwise.
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_alpha = false;
    for ch in value.chars() {
        if prev_alpha {
            out.extend(ch.to_lowercase());
        } else {
            out.extend(ch.to_uppercase());
        }
        prev_alpha = ch.is_alphabetic();
    }
    out
}

/// Upper-cases the first character only.
pub fn capfirst(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_names() {
        let meta = ModelMeta::new("contacts", "PhoneNumber");
        assert_eq!(meta.model_name, "phonenumber");
        assert_eq!(meta.verbose_name, "phone number");
        assert_eq!(meta.verbose_name_plural, "phone numbers");
        assert_eq!(meta.label(), "contacts.PhoneNumber");
        assert_eq!(meta.perm("change"), "contacts.change_phonenumber");
    }

    #[test]
    fn test_equality_ignores_display_names() {
        let a = ModelMeta::new("contacts", "Contact");
        let b = ModelMeta::new("contacts", "Contact").with_verbose_name_plural("people");
        assert_eq!(a, b);
        assert!(a.matches("contacts", "CONTACT"));
        assert!(!a.matches("Contacts", "contact"));
    }

    #[test]
    fn test_title_case_and_capfirst() {
        assert_eq!(title_case("contact settings"), "Contact Settings");
        assert_eq!(title_case("e-mail settings"), "E-Mail Settings");
        assert_eq!(title_case("mailing list 2fa"), "Mailing List 2Fa");
        assert_eq!(title_case("SMTP relays"), "Smtp Relays");
        assert_eq!(capfirst("addresses"), "Addresses");
        assert_eq!(capfirst(""), "");
    }
}
