use tokio::sync::broadcast;

use crate::config::AppConfig;
use crate::services::calls::{CallEvent, CallRegistry};

const EVENT_CHANNEL_CAPACITY: usize = 256;

pub struct AppState {
    pub config: AppConfig,
    pub calls: CallRegistry,
    pub events_tx: broadcast::Sender<CallEvent>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            config,
            calls: CallRegistry::default(),
            events_tx,
        }
    }
}
