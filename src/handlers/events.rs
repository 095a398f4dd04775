use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::response::sse::{Event, Sse};
use serde::Deserialize;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::{BroadcastStream, IntervalStream};
use tokio_stream::StreamExt;

use crate::errors::AppError;
use crate::state::AppState;

const KEEPALIVE_EVERY: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
pub struct EventsQuery {
    pub token: Option<String>,
}

// GET /api/events?token=...
pub async fn events_stream(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EventsQuery>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>, AppError> {
    // EventSource can't set headers, so the token rides in the query
    if query.token.as_deref().unwrap_or("") != state.config.admin_token {
        return Err(AppError::Unauthorized);
    }

    let rx = state.events_tx.subscribe();

    let live_stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(event) => match serde_json::to_string(&event) {
            Ok(data) => Some(Ok::<_, Infallible>(Event::default().data(data).event("call_event"))),
            Err(e) => {
                tracing::error!(call_id = %event.call_id, error = %e, "failed to serialize call event");
                None
            }
        },
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(skipped, "event subscriber lagged");
            None
        }
    });

    let keepalive_stream = IntervalStream::new(tokio::time::interval(KEEPALIVE_EVERY))
        .map(|_| Ok::<_, Infallible>(Event::default().comment("keepalive")));

    Ok(Sse::new(live_stream.merge(keepalive_stream)))
}
