//! Trusted-header authentication.
//!
//! A fronting proxy authenticates users and forwards the username in the
//! configured header. The middleware resolves the username against the
//! configured accounts and inserts the resulting [`Viewer`] into the
//! request extensions. Requests without the header carry no viewer.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

use coreplus_core::config::auth::AuthConfig;
use coreplus_core::types::Viewer;

/// Resolves `username` against the configured accounts.
///
/// Unknown usernames become active viewers without admin access or
/// permissions.
pub fn resolve_viewer(config: &AuthConfig, username: &str) -> Viewer {
    let mut viewer = Viewer::new(username);
    if let Some(account) = config.users.get(username) {
        viewer.is_active = account.is_active;
        viewer.is_staff = account.is_staff || account.is_superuser;
        viewer.is_superuser = account.is_superuser;
        viewer.permissions = account.permissions.iter().cloned().collect();
    }
    viewer
}

/// Inserts the viewer named by the trusted header.
pub async fn remote_user(
    State(config): State<Arc<AuthConfig>>,
    mut request: Request,
    next: Next,
) -> Response {
    let username = request
        .headers()
        .get(config.remote_user_header.as_str())
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string);

    if let Some(username) = username {
        let viewer = resolve_viewer(&config, &username);
        debug!(username = %viewer.username, staff = viewer.is_staff, "Viewer resolved");
        request.extensions_mut().insert(viewer);
    }

    next.run(request).await
}
