//! services/bot/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::handler::handle_input;
use crate::web::protocol::{InboundEvent, OutboundMessage, PremiumRequest, ReadingView, DrawnCardView};
use crate::web::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use std::sync::Arc;
use tarot_core::ports::PortError;
use tracing::{error, info};
use utoipa::{IntoParams, OpenApi};

/// Upper bound for `limit` on the history endpoint.
const MAX_HISTORY_LIMIT: usize = 50;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        events_handler,
        list_readings_handler,
        set_premium_handler,
    ),
    components(
        schemas(InboundEvent, OutboundMessage, ReadingView, DrawnCardView, PremiumRequest)
    ),
    tags(
        (name = "Tarot Bot API", description = "Conversation endpoint for messaging transports, plus reading history and admin.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Query Structs
//=========================================================================================

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryQuery {
    /// Number of readings to return, newest first.
    limit: Option<usize>,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Deliver one user event and receive the bot's replies.
///
/// Events for the same user are applied in arrival order.
#[utoipa::path(
    post,
    path = "/events",
    request_body = InboundEvent,
    responses(
        (status = 200, description = "Replies to relay to the user, in order", body = [OutboundMessage]),
        (status = 400, description = "The event carries neither text nor a choice")
    )
)]
pub async fn events_handler(
    State(app_state): State<Arc<AppState>>,
    Json(event): Json<InboundEvent>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let input = event.input().ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            "Either text or choice is required".to_string(),
        )
    })?;

    let username = event.username.as_deref().unwrap_or_default();
    let replies = handle_input(&app_state, event.user_id, username, input).await;
    Ok(Json(replies))
}

/// List a user's most recent readings.
#[utoipa::path(
    get,
    path = "/users/{user_id}/readings",
    params(
        ("user_id" = i64, Path, description = "Transport user id."),
        HistoryQuery
    ),
    responses(
        (status = 200, description = "Readings, newest first", body = [ReadingView]),
        (status = 404, description = "Unknown user"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_readings_handler(
    State(app_state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let limit = query
        .limit
        .unwrap_or(app_state.config.history_limit)
        .clamp(1, MAX_HISTORY_LIMIT);

    let result = async {
        if app_state.db.get_user(user_id).await?.is_none() {
            return Err(PortError::NotFound(format!("User {} not found", user_id)));
        }
        app_state.db.get_user_readings(user_id, limit).await
    }
    .await;

    match result {
        Ok(readings) => {
            let views: Vec<ReadingView> = readings.iter().map(ReadingView::from).collect();
            Ok(Json(views))
        }
        Err(PortError::NotFound(message)) => Err((StatusCode::NOT_FOUND, message)),
        Err(e) => {
            error!("Failed to list readings: {:?}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to list readings".to_string(),
            ))
        }
    }
}

/// Grant or revoke premium for a user.
///
/// Requires the `x-admin-token` header to match the configured admin token.
#[utoipa::path(
    put,
    path = "/users/{user_id}/premium",
    request_body = PremiumRequest,
    params(
        ("user_id" = i64, Path, description = "Transport user id."),
        ("x-admin-token" = String, Header, description = "Operator token.")
    ),
    responses(
        (status = 204, description = "Tier updated"),
        (status = 401, description = "Missing or wrong admin token"),
        (status = 403, description = "Admin endpoint disabled"),
        (status = 404, description = "Unknown user"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn set_premium_handler(
    State(app_state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    Json(body): Json<PremiumRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    match app_state.db.set_premium(user_id, body.premium).await {
        Ok(()) => {
            info!(user_id, premium = body.premium, "Premium status changed.");
            Ok(StatusCode::NO_CONTENT)
        }
        Err(PortError::NotFound(message)) => Err((StatusCode::NOT_FOUND, message)),
        Err(e) => {
            error!("Failed to set premium: {:?}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to set premium".to_string(),
            ))
        }
    }
}
