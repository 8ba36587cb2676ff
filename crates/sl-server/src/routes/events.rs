//! SSE event stream route handler.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

use crate::context::AppContext;

/// GET /api/events
///
/// Streams job lifecycle events as they happen. A client that falls behind
/// the broadcast buffer simply misses the lagged events.
pub async fn events_handler(
    State(ctx): State<AppContext>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = ctx.event_bus.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|item| match item {
        Ok(event) => serde_json::to_string(&event)
            .ok()
            .map(|json| Ok(SseEvent::default().event("job").data(json))),
        // Lagged receiver; skip what was missed.
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
