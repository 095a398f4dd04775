pub mod calls;
pub mod events;
pub mod health;
pub mod tools;

use std::sync::Arc;

use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::errors::AppError;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/registry", get(calls::get_registry))
        .route("/api/calls", post(calls::create_call))
        .route(
            "/api/calls/:id",
            get(calls::get_call).delete(calls::end_call),
        )
        .route(
            "/api/calls/:id/actions",
            get(calls::list_actions).post(calls::apply_action),
        )
        .route("/api/calls/:id/wrap-up", get(calls::wrap_up))
        .route(
            "/api/calls/:id/tools/update_state",
            post(tools::update_state),
        )
        .route(
            "/api/calls/:id/tools/check_desired_date",
            post(tools::check_desired_date),
        )
        .route("/api/events", get(events::events_stream))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub(crate) fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token != expected_token {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}
