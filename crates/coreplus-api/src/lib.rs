//! # coreplus-api
//!
//! HTTP layer for Coreplus built on Axum.
//!
//! Assembles the versioned REST API and the admin site from the hook
//! directory, and provides middleware (trusted-header authentication,
//! require-staff, CORS, request logging), DTOs, and the server runner.

pub mod admin;
pub mod app;
pub mod dto;
pub mod handlers;
pub mod helpers;
pub mod middleware;
pub mod router;
pub mod schema;
pub mod state;

pub use app::{build_app, build_state, run_server};
pub use state::AppState;
