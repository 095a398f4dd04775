use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::call_state::State;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CallData {
    #[serde(rename = "stateHistory", default)]
    pub state_history: Vec<State>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rescheduled_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rescheduled_time: Option<String>,
    #[serde(default)]
    pub confirmed: bool,
    #[serde(default)]
    pub cancelled: bool,
    #[serde(rename = "wrongNumber", default)]
    pub wrong_number: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct CallDataPatch {
    #[serde(default)]
    pub rescheduled_date: Option<String>,
    #[serde(default)]
    pub rescheduled_time: Option<String>,
    #[serde(default)]
    pub confirmed: Option<bool>,
    #[serde(default)]
    pub cancelled: Option<bool>,
    #[serde(rename = "wrongNumber", default)]
    pub wrong_number: Option<bool>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

const HISTORY_KEY: &str = "stateHistory";

impl CallDataPatch {
    // null means no patch; anything other than an object is rejected.
    pub fn from_value(value: Option<Value>) -> Result<Option<Self>, serde_json::Error> {
        match value {
            None | Some(Value::Null) => Ok(None),
            Some(v) => serde_json::from_value(v).map(Some),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl CallData {
    pub fn merge(&mut self, patch: &CallDataPatch) {
        if let Some(date) = &patch.rescheduled_date {
            self.rescheduled_date = Some(date.clone());
        }
        if let Some(time) = &patch.rescheduled_time {
            self.rescheduled_time = Some(time.clone());
        }
        if let Some(confirmed) = patch.confirmed {
            self.confirmed = confirmed;
        }
        if let Some(cancelled) = patch.cancelled {
            self.cancelled = cancelled;
        }
        if let Some(wrong_number) = patch.wrong_number {
            self.wrong_number = wrong_number;
        }
        if let Some(notes) = &patch.notes {
            self.notes = Some(notes.clone());
        }

        for (key, value) in &patch.extra {
            if key == HISTORY_KEY {
                tracing::warn!("ignoring caller-supplied stateHistory");
                continue;
            }
            self.extra.insert(key.clone(), value.clone());
        }
    }

    pub fn has_reschedule(&self) -> bool {
        self.rescheduled_date
            .as_deref()
            .is_some_and(|d| !d.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationState {
    pub previous_state: Option<State>,
    pub current_state: State,
    pub call_data: CallData,
}

impl ConversationState {
    pub fn initial() -> Self {
        Self {
            previous_state: None,
            current_state: State::Initial,
            call_data: CallData::default(),
        }
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::initial()
    }
}
