use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::services::tools;
use crate::state::AppState;

// Loosely typed: a malformed tool call must still get a readable answer.
#[derive(Deserialize)]
pub struct UpdateStateRequest {
    #[serde(default)]
    pub action: Option<serde_json::Value>,
    #[serde(rename = "additionalData", default)]
    pub additional_data: Option<serde_json::Value>,
}

// POST /api/calls/:id/tools/update_state
pub async fn update_state(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateStateRequest>,
) -> Result<String, AppError> {
    tools::update_state(&state, id, body.action.as_ref(), body.additional_data)
}

#[derive(Deserialize)]
pub struct CheckDateRequest {
    #[serde(default)]
    pub date: Option<serde_json::Value>,
}

// POST /api/calls/:id/tools/check_desired_date
pub async fn check_desired_date(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<CheckDateRequest>,
) -> Result<impl IntoResponse, AppError> {
    // Only checks the call exists; availability is not call-specific.
    state.calls.get(id)?;
    let result = tools::check_desired_date(body.date.as_ref());
    Ok(([(header::CONTENT_TYPE, "application/json")], result))
}
