use crate::models::{Action, CallDataPatch, ConversationState, State};
use crate::services::registry;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransitionError {
    #[error(
        "invalid transition: action \"{action}\" is not allowed in state \"{state}\"; valid actions: {}",
        join_actions(.legal)
    )]
    InvalidTransition {
        state: State,
        action: String,
        legal: Vec<Action>,
    },
}

impl TransitionError {
    fn invalid(state: State, action: &str) -> Self {
        TransitionError::InvalidTransition {
            state,
            action: action.to_string(),
            legal: registry::available_actions(state),
        }
    }

    pub fn legal_actions(&self) -> &[Action] {
        match self {
            TransitionError::InvalidTransition { legal, .. } => legal,
        }
    }
}

fn join_actions(actions: &[Action]) -> String {
    if actions.is_empty() {
        return "none (the call has ended)".to_string();
    }
    actions
        .iter()
        .map(Action::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn transition(
    current: &ConversationState,
    action: Action,
    incoming: Option<&CallDataPatch>,
) -> Result<ConversationState, TransitionError> {
    let from = current.current_state;
    let spec = registry::action_spec(from, action)
        .ok_or_else(|| TransitionError::invalid(from, action.as_str()))?;

    let mut call_data = current.call_data.clone();
    spec.patch.apply(&mut call_data);
    if let Some(patch) = incoming {
        call_data.merge(patch);
    }
    call_data.state_history.push(from);

    Ok(ConversationState {
        previous_state: Some(from),
        current_state: spec.next_state,
        call_data,
    })
}

pub fn transition_named(
    current: &ConversationState,
    action: &str,
    incoming: Option<&CallDataPatch>,
) -> Result<(Action, ConversationState), TransitionError> {
    let parsed = Action::parse(action)
        .ok_or_else(|| TransitionError::invalid(current.current_state, action.trim()))?;
    transition(current, parsed, incoming).map(|next| (parsed, next))
}
