//! # coreplus-hooks
//!
//! Extension-point directory for Coreplus. Provides:
//!
//! - A priority-ordered multimap from hook name to contributors
//! - One-shot discovery of hook modules exposed by installed apps
//! - Typed descriptor shapes for every hook convention
//! - A dispatcher that invokes contributors in order
//! - Introspection rows for operators

pub mod apps;
pub mod definitions;
pub mod dispatcher;
pub mod introspection;
pub mod macros;
pub mod registry;

pub use apps::{AppRegistry, HookModule, InstalledApp};
pub use definitions::{
    AdminHandler, AdminViewRegistration, ApiViewRegistration, HookContext, HookValue,
    SettingsMenuItem, UrlInclude, ViewSetRegistration,
};
pub use dispatcher::HookDispatcher;
pub use introspection::{ContributorDescription, HookDescription};
pub use registry::{Contributor, HookDirectory, HookEntry, HookNames, PriorityRegistrar};
