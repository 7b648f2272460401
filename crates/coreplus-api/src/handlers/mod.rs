//! Request handlers not contributed through hooks.

pub mod health;
