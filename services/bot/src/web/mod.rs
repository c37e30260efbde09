pub mod handler;
pub mod middleware;
pub mod protocol;
pub mod replies;
pub mod rest;
pub mod sessions;
pub mod state;

pub use handler::handle_input;
pub use middleware::require_admin;
pub use rest::{events_handler, list_readings_handler, set_premium_handler};

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use state::AppState;
use std::sync::Arc;

/// Builds the API router without the Swagger UI.
pub fn router(app_state: Arc<AppState>) -> Router {
    // Admin routes (token required)
    let admin_routes = Router::new()
        .route("/users/{user_id}/premium", put(set_premium_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_admin,
        ));

    Router::new()
        .route("/events", post(events_handler))
        .route("/users/{user_id}/readings", get(list_readings_handler))
        .merge(admin_routes)
        .with_state(app_state)
}
