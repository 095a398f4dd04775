use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::handlers::check_auth;
use crate::models::{Action, AppointmentDetails, ConversationState};
use crate::services::calls::{self, ActionSource, CallSession};
use crate::services::registry::{self, StateEntry};
use crate::services::templates;
use crate::services::tools::{self, BootstrapPayload};
use crate::state::AppState;

// GET /api/registry
pub async fn get_registry() -> Json<Vec<StateEntry>> {
    Json(registry::catalogue())
}

// POST /api/calls
pub async fn create_call(
    State(state): State<Arc<AppState>>,
    Json(details): Json<AppointmentDetails>,
) -> Result<(StatusCode, Json<BootstrapPayload>), AppError> {
    details
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let details = details.with_default_company(&state.config.default_company_name);

    let session = state.calls.create(details)?;
    tracing::info!(
        call_id = %session.id,
        client = %session.details.client_name,
        company = %session.details.company_name,
        "call created"
    );

    Ok((
        StatusCode::CREATED,
        Json(tools::bootstrap(&state.config, &session)),
    ))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallView {
    #[serde(flatten)]
    pub session: CallSession,
    pub available_actions: Vec<Action>,
}

impl From<CallSession> for CallView {
    fn from(session: CallSession) -> Self {
        let available_actions = session.available_actions();
        Self {
            session,
            available_actions,
        }
    }
}

// GET /api/calls/:id
pub async fn get_call(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<CallView>, AppError> {
    Ok(Json(state.calls.get(id)?.into()))
}

// DELETE /api/calls/:id
pub async fn end_call(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<CallView>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let session = state.calls.remove(id)?;
    tracing::info!(
        call_id = %id,
        state = %session.state.current_state,
        "call session closed"
    );
    Ok(Json(session.into()))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionOption {
    pub action: Action,
    pub description: &'static str,
}

// GET /api/calls/:id/actions
pub async fn list_actions(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let session = state.calls.get(id)?;
    let current = session.state.current_state;
    let options: Vec<ActionOption> = registry::legal_actions(current)
        .iter()
        .map(|spec| ActionOption {
            action: spec.action,
            description: spec.description,
        })
        .collect();

    Ok(Json(serde_json::json!({
        "currentState": current,
        "actions": options,
    })))
}

#[derive(Deserialize)]
pub struct ApplyActionRequest {
    pub action: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyActionResponse {
    pub state: ConversationState,
    pub instruction: String,
    pub available_actions: Vec<Action>,
}

// POST /api/calls/:id/actions
pub async fn apply_action(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(body): Json<ApplyActionRequest>,
) -> Result<Json<ApplyActionResponse>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let session = calls::apply_action(&state, id, ActionSource::Operator, &body.action, None)?;
    Ok(Json(ApplyActionResponse {
        instruction: session.instruction(),
        available_actions: session.available_actions(),
        state: session.state,
    }))
}

// GET /api/calls/:id/wrap-up
pub async fn wrap_up(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<String, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    state.calls.get(id)?;
    Ok(templates::wrap_instruction(templates::WRAP_UP_TEXT))
}
