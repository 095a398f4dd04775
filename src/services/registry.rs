use serde::Serialize;

use crate::models::{Action, CallData, State, STATE_ORDER};

// Applied before any caller-supplied data is merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataPatch {
    Nothing,
    MarkWrongNumber,
    MarkConfirmed,
    MarkCancelled,
}

impl DataPatch {
    pub fn apply(self, data: &mut CallData) {
        match self {
            DataPatch::Nothing => {}
            DataPatch::MarkWrongNumber => data.wrong_number = true,
            DataPatch::MarkConfirmed => data.confirmed = true,
            DataPatch::MarkCancelled => data.cancelled = true,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionSpec {
    pub action: Action,
    pub description: &'static str,
    pub next_state: State,
    #[serde(skip)]
    pub patch: DataPatch,
}

const fn spec(
    action: Action,
    description: &'static str,
    next_state: State,
    patch: DataPatch,
) -> ActionSpec {
    ActionSpec {
        action,
        description,
        next_state,
        patch,
    }
}

const INITIAL: &[ActionSpec] = &[spec(
    Action::StartCall,
    "Initiate the outbound call",
    State::IdentityChecking,
    DataPatch::Nothing,
)];

const IDENTITY_CHECKING: &[ActionSpec] = &[
    spec(
        Action::ConfirmIdentity,
        "Confirm you're speaking with the client",
        State::AttendanceChecking,
        DataPatch::Nothing,
    ),
    spec(
        Action::WrongNumber,
        "The person is not the client and doesn't know them",
        State::CallEnded,
        DataPatch::MarkWrongNumber,
    ),
];

const ATTENDANCE_CHECKING: &[ActionSpec] = &[
    spec(
        Action::CanAttend,
        "The client can attend the scheduled appointment",
        State::AppointmentConfirmed,
        DataPatch::MarkConfirmed,
    ),
    spec(
        Action::CannotAttend,
        "The client cannot attend the scheduled appointment",
        State::RescheduleOffering,
        DataPatch::Nothing,
    ),
];

const APPOINTMENT_CONFIRMED: &[ActionSpec] = &[spec(
    Action::EndCall,
    "End the call",
    State::CallEnded,
    DataPatch::Nothing,
)];

const RESCHEDULE_OFFERING: &[ActionSpec] = &[spec(
    Action::OfferAlternatives,
    "Offer alternative appointment times",
    State::RescheduleChecking,
    DataPatch::Nothing,
)];

const RESCHEDULE_CHECKING: &[ActionSpec] = &[
    spec(
        Action::CanReschedule,
        "The client can make one of the alternative times",
        State::RescheduleConfirmed,
        DataPatch::Nothing,
    ),
    spec(
        Action::CannotReschedule,
        "The client cannot make any of the alternative times",
        State::AppointmentCancelled,
        DataPatch::MarkCancelled,
    ),
];

const RESCHEDULE_CONFIRMED: &[ActionSpec] = &[spec(
    Action::EndCall,
    "End the call",
    State::CallEnded,
    DataPatch::Nothing,
)];

const APPOINTMENT_CANCELLED: &[ActionSpec] = &[spec(
    Action::EndCall,
    "End the call",
    State::CallEnded,
    DataPatch::Nothing,
)];

pub fn legal_actions(state: State) -> &'static [ActionSpec] {
    match state {
        State::Initial => INITIAL,
        State::IdentityChecking => IDENTITY_CHECKING,
        State::AttendanceChecking => ATTENDANCE_CHECKING,
        State::AppointmentConfirmed => APPOINTMENT_CONFIRMED,
        State::RescheduleOffering => RESCHEDULE_OFFERING,
        State::RescheduleChecking => RESCHEDULE_CHECKING,
        State::RescheduleConfirmed => RESCHEDULE_CONFIRMED,
        State::AppointmentCancelled => APPOINTMENT_CANCELLED,
        State::CallEnded => &[],
    }
}

pub fn available_actions(state: State) -> Vec<Action> {
    legal_actions(state).iter().map(|s| s.action).collect()
}

pub fn action_spec(state: State, action: Action) -> Option<&'static ActionSpec> {
    legal_actions(state).iter().find(|s| s.action == action)
}

pub fn next_state(state: State, action: Action) -> Option<State> {
    action_spec(state, action).map(|s| s.next_state)
}

pub fn action_description(action: Action) -> Option<&'static str> {
    STATE_ORDER
        .into_iter()
        .find_map(|state| action_spec(state, action))
        .map(|s| s.description)
}

#[derive(Debug, Clone, Serialize)]
pub struct StateEntry {
    pub state: State,
    pub description: &'static str,
    pub terminal: bool,
    pub actions: &'static [ActionSpec],
}

pub fn catalogue() -> Vec<StateEntry> {
    STATE_ORDER
        .into_iter()
        .map(|state| StateEntry {
            state,
            description: state.description(),
            terminal: state.is_terminal(),
            actions: legal_actions(state),
        })
        .collect()
}
