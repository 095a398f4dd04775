use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Action, AppointmentDetails, CallDataPatch, ConversationState};
use crate::services::{registry, templates, transition};
use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallSession {
    pub id: Uuid,
    pub details: AppointmentDetails,
    pub state: ConversationState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CallSession {
    pub fn available_actions(&self) -> Vec<Action> {
        registry::available_actions(self.state.current_state)
    }

    pub fn instruction(&self) -> String {
        let text = templates::render(
            self.state.current_state,
            &self.details,
            &self.state.call_data,
            self.state.previous_state,
        );
        templates::wrap_instruction(&text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionSource {
    Agent,
    Operator,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallEvent {
    pub call_id: Uuid,
    pub source: ActionSource,
    pub action: Action,
    pub state: ConversationState,
    pub at: DateTime<Utc>,
}

#[derive(Default)]
pub struct CallRegistry {
    calls: Mutex<HashMap<Uuid, CallSession>>,
}

impl CallRegistry {
    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Uuid, CallSession>>, AppError> {
        self.calls
            .lock()
            .map_err(|_| AppError::Internal("call registry lock poisoned".to_string()))
    }

    pub fn create(&self, details: AppointmentDetails) -> Result<CallSession, AppError> {
        let now = Utc::now();
        let session = CallSession {
            id: Uuid::new_v4(),
            details,
            state: ConversationState::initial(),
            created_at: now,
            updated_at: now,
        };
        self.lock()?.insert(session.id, session.clone());
        Ok(session)
    }

    pub fn get(&self, id: Uuid) -> Result<CallSession, AppError> {
        self.lock()?
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("call {id}")))
    }

    pub fn remove(&self, id: Uuid) -> Result<CallSession, AppError> {
        self.lock()?
            .remove(&id)
            .ok_or_else(|| AppError::NotFound(format!("call {id}")))
    }

    pub fn len(&self) -> usize {
        self.lock().map(|calls| calls.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn evict_ended(&self, ttl: Duration, now: DateTime<Utc>) -> Result<usize, AppError> {
        let mut calls = self.lock()?;
        let before = calls.len();
        calls.retain(|_, session| {
            !(session.state.current_state.is_terminal() && now - session.updated_at >= ttl)
        });
        Ok(before - calls.len())
    }

    // On failure the stored state is left as it was and nothing is published.
    pub fn apply(
        &self,
        id: Uuid,
        source: ActionSource,
        action: &str,
        patch: Option<&CallDataPatch>,
        events: &broadcast::Sender<CallEvent>,
    ) -> Result<(Action, CallSession), AppError> {
        let mut calls = self.lock()?;
        let session = calls
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("call {id}")))?;

        let (applied, next) = transition::transition_named(&session.state, action, patch)?;

        session.state = next;
        session.updated_at = Utc::now();

        // Sent under the lock so events leave in commit order. No subscribers is fine.
        let _ = events.send(CallEvent {
            call_id: id,
            source,
            action: applied,
            state: session.state.clone(),
            at: session.updated_at,
        });

        Ok((applied, session.clone()))
    }
}

pub fn apply_action(
    state: &Arc<AppState>,
    call_id: Uuid,
    source: ActionSource,
    action: &str,
    patch: Option<&CallDataPatch>,
) -> Result<CallSession, AppError> {
    let outcome = state
        .calls
        .apply(call_id, source, action, patch, &state.events_tx);
    let (applied, session) = match outcome {
        Ok(done) => done,
        Err(AppError::InvalidTransition(e)) => {
            tracing::warn!(call_id = %call_id, source = ?source, action, error = %e, "rejected transition");
            return Err(e.into());
        }
        Err(e) => return Err(e),
    };

    tracing::info!(
        call_id = %call_id,
        source = ?source,
        action = %applied,
        from = ?session.state.previous_state,
        to = %session.state.current_state,
        "state transition"
    );

    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::models::appointment::fixtures::sample_details;
    use crate::models::State;

    fn channel() -> broadcast::Sender<CallEvent> {
        broadcast::channel(16).0
    }

    fn app_state() -> Arc<AppState> {
        Arc::new(AppState::new(AppConfig {
            port: 0,
            admin_token: "t".to_string(),
            agent_name: "Alex".to_string(),
            agent_voice: "Mark".to_string(),
            default_company_name: "Acme Appointments".to_string(),
            include_state_listing: false,
            ended_call_ttl_secs: 3600,
        }))
    }

    #[test]
    fn test_apply_replaces_state() {
        let calls = CallRegistry::default();
        let events = channel();
        let session = calls.create(sample_details()).unwrap();

        let (action, updated) = calls
            .apply(session.id, ActionSource::Agent, "start_call", None, &events)
            .unwrap();
        assert_eq!(action, Action::StartCall);
        assert_eq!(updated.state.current_state, State::IdentityChecking);
        assert_eq!(calls.get(session.id).unwrap().state, updated.state);
    }

    #[test]
    fn test_rejected_action_keeps_stored_state() {
        let calls = CallRegistry::default();
        let events = channel();
        let session = calls.create(sample_details()).unwrap();

        let err = calls
            .apply(session.id, ActionSource::Agent, "end_call", None, &events)
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
        assert_eq!(calls.get(session.id).unwrap().state, ConversationState::initial());
    }

    #[test]
    fn test_unknown_call() {
        let calls = CallRegistry::default();
        let err = calls
            .apply(Uuid::new_v4(), ActionSource::Agent, "start_call", None, &channel())
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_remove_returns_final_state() {
        let calls = CallRegistry::default();
        let session = calls.create(sample_details()).unwrap();
        calls
            .apply(session.id, ActionSource::Agent, "start_call", None, &channel())
            .unwrap();

        let removed = calls.remove(session.id).unwrap();
        assert_eq!(removed.state.current_state, State::IdentityChecking);
        assert!(calls.is_empty());
    }

    #[test]
    fn test_concurrent_transitions_are_linearized() {
        let calls = Arc::new(CallRegistry::default());
        let events = channel();
        let session = calls.create(sample_details()).unwrap();
        calls
            .apply(session.id, ActionSource::Agent, "start_call", None, &events)
            .unwrap();

        // Both threads race to leave identity_checking; exactly one wins.
        let handles: Vec<_> = ["confirm_identity", "wrong_number"]
            .into_iter()
            .map(|action| {
                let calls = Arc::clone(&calls);
                let events = events.clone();
                std::thread::spawn(move || {
                    calls
                        .apply(session.id, ActionSource::Agent, action, None, &events)
                        .is_ok()
                })
            })
            .collect();
        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(wins, 1);
        let stored = calls.get(session.id).unwrap();
        assert_eq!(
            stored.state.call_data.state_history,
            vec![State::Initial, State::IdentityChecking]
        );
    }

    #[test]
    fn test_events_arrive_in_commit_order() {
        let calls = Arc::new(CallRegistry::default());
        let events = channel();
        let mut rx = events.subscribe();
        let session = calls.create(sample_details()).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let calls = Arc::clone(&calls);
                let events = events.clone();
                std::thread::spawn(move || {
                    for action in ["start_call", "confirm_identity", "can_attend", "end_call"] {
                        let _ = calls.apply(session.id, ActionSource::Agent, action, None, &events);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let mut seen = Vec::new();
        while let Ok(event) = rx.try_recv() {
            seen.push(event.state.current_state);
        }
        assert_eq!(
            seen,
            vec![
                State::IdentityChecking,
                State::AttendanceChecking,
                State::AppointmentConfirmed,
                State::CallEnded,
            ]
        );
        assert_eq!(
            calls.get(session.id).unwrap().state.current_state,
            State::CallEnded
        );
    }

    #[test]
    fn test_committed_action_publishes_one_event() {
        let state = app_state();
        let mut rx = state.events_tx.subscribe();
        let session = state.calls.create(sample_details()).unwrap();

        apply_action(&state, session.id, ActionSource::Operator, "start_call", None).unwrap();

        let event = rx.try_recv().unwrap();
        assert_eq!(event.call_id, session.id);
        assert_eq!(event.source, ActionSource::Operator);
        assert_eq!(event.action, Action::StartCall);
        assert_eq!(event.state.current_state, State::IdentityChecking);
        assert_eq!(event.state.previous_state, Some(State::Initial));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_rejected_action_publishes_nothing() {
        let state = app_state();
        let mut rx = state.events_tx.subscribe();
        let session = state.calls.create(sample_details()).unwrap();

        let err = apply_action(&state, session.id, ActionSource::Agent, "end_call", None)
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[test]
    fn test_evict_ended_only_drops_old_terminal_calls() {
        let calls = CallRegistry::default();
        let events = channel();
        let ended = calls.create(sample_details()).unwrap();
        for action in ["start_call", "wrong_number"] {
            calls
                .apply(ended.id, ActionSource::Agent, action, None, &events)
                .unwrap();
        }
        let live = calls.create(sample_details()).unwrap();

        let ttl = Duration::minutes(10);
        assert_eq!(calls.evict_ended(ttl, Utc::now()).unwrap(), 0);

        let later = Utc::now() + Duration::minutes(11);
        assert_eq!(calls.evict_ended(ttl, later).unwrap(), 1);
        assert!(calls.get(ended.id).is_err());
        assert!(calls.get(live.id).is_ok());
    }

    #[test]
    fn test_instruction_is_wrapped() {
        let calls = CallRegistry::default();
        let session = calls.create(sample_details()).unwrap();
        let text = session.instruction();
        assert!(text.starts_with("<instruction>Preparing to make an outbound call"));
        assert!(text.ends_with("</instruction>"));
    }
}
