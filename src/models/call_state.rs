use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum State {
    Initial,
    IdentityChecking,
    AttendanceChecking,
    AppointmentConfirmed,
    RescheduleOffering,
    RescheduleChecking,
    RescheduleConfirmed,
    AppointmentCancelled,
    CallEnded,
}

pub const STATE_ORDER: [State; 9] = [
    State::Initial,
    State::IdentityChecking,
    State::AttendanceChecking,
    State::AppointmentConfirmed,
    State::RescheduleOffering,
    State::RescheduleChecking,
    State::RescheduleConfirmed,
    State::AppointmentCancelled,
    State::CallEnded,
];

impl State {
    pub fn as_str(&self) -> &'static str {
        match self {
            State::Initial => "initial",
            State::IdentityChecking => "identity_checking",
            State::AttendanceChecking => "attendance_checking",
            State::AppointmentConfirmed => "appointment_confirmed",
            State::RescheduleOffering => "reschedule_offering",
            State::RescheduleChecking => "reschedule_checking",
            State::RescheduleConfirmed => "reschedule_confirmed",
            State::AppointmentCancelled => "appointment_cancelled",
            State::CallEnded => "call_ended",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        STATE_ORDER.into_iter().find(|state| state.as_str() == s)
    }

    pub fn description(&self) -> &'static str {
        match self {
            State::Initial => "Preparing to start the call",
            State::IdentityChecking => "Verifying the identity of the person answering the call",
            State::AttendanceChecking => {
                "Confirming if the client can attend the scheduled appointment"
            }
            State::AppointmentConfirmed => "Appointment confirmed for the original time",
            State::RescheduleOffering => "Offering alternative appointment times",
            State::RescheduleChecking => {
                "Confirming if any of the alternative times work for the client"
            }
            State::RescheduleConfirmed => "Appointment rescheduled for a new time",
            State::AppointmentCancelled => "Appointment cancelled",
            State::CallEnded => "Call completed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, State::CallEnded)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    StartCall,
    ConfirmIdentity,
    WrongNumber,
    CanAttend,
    CannotAttend,
    OfferAlternatives,
    CanReschedule,
    CannotReschedule,
    EndCall,
}

const ALL_ACTIONS: [Action; 9] = [
    Action::StartCall,
    Action::ConfirmIdentity,
    Action::WrongNumber,
    Action::CanAttend,
    Action::CannotAttend,
    Action::OfferAlternatives,
    Action::CanReschedule,
    Action::CannotReschedule,
    Action::EndCall,
];

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::StartCall => "start_call",
            Action::ConfirmIdentity => "confirm_identity",
            Action::WrongNumber => "wrong_number",
            Action::CanAttend => "can_attend",
            Action::CannotAttend => "cannot_attend",
            Action::OfferAlternatives => "offer_alternatives",
            Action::CanReschedule => "can_reschedule",
            Action::CannotReschedule => "cannot_reschedule",
            Action::EndCall => "end_call",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let label = s.trim().to_ascii_lowercase();
        ALL_ACTIONS.into_iter().find(|action| action.as_str() == label)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_labels_parse_back() {
        for state in STATE_ORDER {
            assert_eq!(State::parse(state.as_str()), Some(state));
        }
        assert_eq!(State::parse("voicemail"), None);
    }

    #[test]
    fn test_action_parse_is_lenient_about_case() {
        assert_eq!(Action::parse(" End_Call "), Some(Action::EndCall));
        assert_eq!(Action::parse("hang_up"), None);
    }

    #[test]
    fn test_serde_uses_wire_labels() {
        let json = serde_json::to_string(&State::RescheduleChecking).unwrap();
        assert_eq!(json, "\"reschedule_checking\"");
        let action: Action = serde_json::from_str("\"cannot_attend\"").unwrap();
        assert_eq!(action, Action::CannotAttend);
    }

    #[test]
    fn test_only_call_ended_is_terminal() {
        let terminal: Vec<State> = STATE_ORDER.into_iter().filter(State::is_terminal).collect();
        assert_eq!(terminal, vec![State::CallEnded]);
    }
}
