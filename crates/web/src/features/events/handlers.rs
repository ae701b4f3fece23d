use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use tokio_stream::{
    Stream, StreamExt,
    wrappers::{BroadcastStream, errors::BroadcastStreamRecvError},
};

use crate::state::AppState;

/// Server-sent stream of registry events. Each message is named after the
/// event's `type` tag and carries the event as JSON.
#[utoipa::path(
    get,
    path = "/api/events",
    responses(
        (status = 200, description = "Stream of registry events", content_type = "text/event-stream", body = storage::RegistryEvent)
    ),
    tag = "events"
)]
pub async fn stream_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::debug!("event stream subscriber connected");

    let stream = BroadcastStream::new(state.registry.subscribe()).filter_map(|message| {
        match message {
            Ok(event) => match Event::default().event(event.name()).json_data(&event) {
                Ok(sse_event) => Some(Ok(sse_event)),
                Err(e) => {
                    tracing::error!(error = %e, "failed to encode registry event");
                    None
                }
            },
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "event stream subscriber lagged");
                None
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
