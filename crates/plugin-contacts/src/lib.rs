//! Contacts application for Coreplus.
//!
//! An address book that plugs into every extension point: a viewset and a
//! search view in the REST API, an export table included under the API,
//! model admins and custom admin views, and a settings type.

pub mod admin;
pub mod api;
pub mod app;
pub mod hooks;
pub mod models;
pub mod store;

pub use app::ContactsApp;
pub use store::{Contact, ContactStore, NewContact};
