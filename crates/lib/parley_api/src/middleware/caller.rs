//! Caller identity middleware.
//!
//! Authentication happens upstream; the gateway forwards the authenticated
//! user's ID in [`CALLER_HEADER`]. This layer only parses it.

use axum::{extract::Request, middleware::Next, response::Response};
use uuid::Uuid;

use crate::error::AppError;

/// Header carrying the caller's user ID.
pub const CALLER_HEADER: &str = "x-user-id";

/// The requesting user, stored in request extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(pub Uuid);

/// Axum middleware: parses [`CALLER_HEADER`] and injects [`Caller`] into
/// request extensions.
pub async fn require_caller(mut request: Request, next: Next) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(CALLER_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Not authorized, no caller identity".into()))?;

    let user_id = Uuid::parse_str(header.trim())
        .map_err(|_| AppError::Unauthorized("Not authorized, malformed caller identity".into()))?;

    request.extensions_mut().insert(Caller(user_id));

    Ok(next.run(request).await)
}
