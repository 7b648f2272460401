//! # coreplus-core
//!
//! Core crate for Coreplus. Contains the unified error system, the typed
//! application configuration, the settings facade with import-string
//! resolution, shared types (model metadata, viewers), and the routing
//! primitives every extension point produces routes with.
//!
//! This crate has **no** internal dependencies on other Coreplus crates.

pub mod config;
pub mod configs;
pub mod error;
pub mod result;
pub mod routing;
pub mod types;

pub use configs::CoreplusSettings;
pub use error::AppError;
pub use result::AppResult;
