use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::{Action, AvailabilityResult, CallDataPatch};
use crate::services::availability::{self, InvalidDateInput};
use crate::services::calls::{self, ActionSource, CallSession};
use crate::services::prompt;
use crate::state::AppState;

pub const UPDATE_STATE_TOOL: &str = "updateState";
pub const CHECK_DESIRED_DATE_TOOL: &str = "checkDesiredDate";
const HANG_UP_TOOL: &str = "hangUp";

pub fn update_state(
    state: &Arc<AppState>,
    call_id: Uuid,
    action: Option<&Value>,
    additional_data: Option<Value>,
) -> Result<String, AppError> {
    let Some(action) = action.and_then(Value::as_str) else {
        let session = state.calls.get(call_id)?;
        tracing::warn!(call_id = %call_id, action = ?action, "updateState without a string action");
        return Ok(format!(
            "Error updating state: 'action' is required and must be a string. \
             Valid actions: {}.",
            list_actions(&session.available_actions())
        ));
    };

    let patch = match CallDataPatch::from_value(additional_data) {
        Ok(patch) => patch.filter(|p| !p.is_empty()),
        Err(e) => {
            tracing::warn!(call_id = %call_id, action, error = %e, "unusable additionalData");
            return Ok(format!(
                "Error updating state: additionalData could not be read ({e}). \
                 Send an object with string dates and times."
            ));
        }
    };

    match calls::apply_action(state, call_id, ActionSource::Agent, action, patch.as_ref()) {
        Ok(session) => Ok(session.instruction()),
        Err(AppError::InvalidTransition(e)) => Ok(format!(
            "Error updating state: {e}. Please try one of the valid actions."
        )),
        Err(e) => Err(e),
    }
}

fn list_actions(actions: &[Action]) -> String {
    if actions.is_empty() {
        return "none (the call has ended)".to_string();
    }
    actions
        .iter()
        .map(Action::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn check_desired_date(date: Option<&Value>) -> String {
    let result = match date {
        None | Some(Value::Null) => availability::check_availability(None),
        Some(Value::String(raw)) => availability::check_availability(Some(raw.as_str())),
        Some(other) => {
            tracing::debug!(input = %other, "non-string date passed to checkDesiredDate");
            AvailabilityResult::unavailable(InvalidDateInput::Unparsable(other.to_string()).to_string())
        }
    };

    serde_json::to_string(&result).unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to serialize availability result");
        json!({ "available": false, "message": result.message }).to_string()
    })
}

pub fn tool_definitions() -> Vec<Value> {
    vec![
        json!({ "toolName": HANG_UP_TOOL }),
        json!({
            "temporaryTool": {
                "modelToolName": UPDATE_STATE_TOOL,
                "description": "Updates the current state and call data",
                "client": {},
                "dynamicParameters": [
                    {
                        "name": "action",
                        "location": "PARAMETER_LOCATION_BODY",
                        "schema": {
                            "type": "string",
                            "description": "The action to perform in the current state."
                        }
                    },
                    {
                        "name": "additionalData",
                        "location": "PARAMETER_LOCATION_BODY",
                        "schema": {
                            "type": "object",
                            "description": "Additional data to update in the call state.",
                            "additionalProperties": true
                        }
                    }
                ],
                "defaultReaction": "AGENT_REACTION_SPEAKS_ONCE"
            }
        }),
        json!({
            "temporaryTool": {
                "modelToolName": CHECK_DESIRED_DATE_TOOL,
                "description": "Check if the desired date is available for an appointment.",
                "client": {},
                "dynamicParameters": [
                    {
                        "name": "date",
                        "location": "PARAMETER_LOCATION_BODY",
                        "schema": {
                            "type": "string",
                            "format": "date-time",
                            "description": "The ISO 8601 datetime to check."
                        }
                    }
                ]
            }
        }),
    ]
}

#[derive(Debug, Serialize)]
pub struct InitialMessage {
    pub role: &'static str,
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapPayload {
    pub call_id: Uuid,
    pub system_prompt: String,
    pub voice: String,
    pub initial_messages: Vec<InitialMessage>,
    pub selected_tools: Vec<Value>,
}

pub fn bootstrap(config: &AppConfig, session: &CallSession) -> BootstrapPayload {
    BootstrapPayload {
        call_id: session.id,
        system_prompt: prompt::system_prompt(
            &session.details,
            &config.agent_name,
            config.include_state_listing,
        ),
        voice: config.agent_voice.clone(),
        initial_messages: vec![InitialMessage {
            role: "MESSAGE_ROLE_USER",
            text: session.instruction(),
        }],
        selected_tools: tool_definitions(),
    }
}
