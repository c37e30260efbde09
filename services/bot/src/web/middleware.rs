//! services/bot/src/web/middleware.rs
//!
//! Admin guard for operator-only routes.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::warn;

use crate::web::state::AppState;

pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Middleware that compares the `x-admin-token` header with the configured token.
///
/// Returns 403 when no token is configured and 401 when the header is missing
/// or does not match.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let expected = state
        .config
        .admin_token
        .as_deref()
        .ok_or(StatusCode::FORBIDDEN)?;

    let provided = req
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    if provided != expected {
        warn!("Rejected admin request with a wrong token.");
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(next.run(req).await)
}
