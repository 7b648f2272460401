//! Admin site: app index builder, model admins, and the admin route table.

pub mod site;
pub mod urls;
pub mod views;

pub use site::{AdminSite, AppEntry, DefaultModelAdmin, ModelAdmin, ModelEntry, ModelPerms};
