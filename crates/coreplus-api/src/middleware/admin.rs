//! Admin access guard.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use coreplus_core::error::AppError;
use coreplus_core::types::Viewer;

/// Rejects requests without an active staff viewer.
///
/// No viewer yields 401; a viewer without admin access yields 403.
pub async fn require_staff(request: Request, next: Next) -> Response {
    let denied = match request.extensions().get::<Viewer>() {
        None => Some(AppError::authentication(
            "Authentication credentials were not provided",
        )),
        Some(viewer) if !viewer.is_admin() => {
            warn!(
                username = %viewer.username,
                path = %request.uri().path(),
                "Admin access denied"
            );
            Some(AppError::authorization("Staff access required"))
        }
        Some(_) => None,
    };

    match denied {
        Some(err) => err.into_response(),
        None => next.run(request).await,
    }
}
