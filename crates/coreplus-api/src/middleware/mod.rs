//! Axum middleware stack.

pub mod admin;
pub mod auth;
pub mod cors;
pub mod logging;
