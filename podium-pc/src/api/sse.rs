//! Server-Sent Events stream for practice lifecycle events
//!
//! GET /api/events. Forwards every event on the bus to the client,
//! tagged with its type name so the frontend can subscribe selectively.

use crate::AppState;
use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tracing::{debug, info, warn};

/// GET /api/events - SSE stream of practice lifecycle events
///
/// Streams every `PracticeEvent`: session create/delete/favorite,
/// attempt starts, analysis start/progress/complete/fail/cancel, rating
/// updates and commits. A heartbeat comment goes out every 15 seconds
/// so idle connections stay open through proxies.
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("New SSE client connected to practice events");

    let mut rx = state.event_bus.subscribe();

    let stream = async_stream::stream! {
        debug!("SSE: practice event stream opened");

        loop {
            tokio::select! {
                // Keeps idle connections alive through proxies
                _ = tokio::time::sleep(Duration::from_secs(15)) => {
                    debug!("SSE: heartbeat");
                    yield Ok(Event::default().comment("heartbeat"));
                }

                Ok(event) = rx.recv() => {
                    let event_type = event.event_type().to_string();
                    match serde_json::to_string(&event) {
                        Ok(payload) => {
                            debug!("SSE: forwarding {}", event_type);
                            yield Ok(Event::default()
                                .event(event_type)
                                .data(payload));
                        }
                        Err(e) => {
                            warn!("SSE: could not serialize {}: {}", event_type, e);
                        }
                    }
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("heartbeat"),
    )
}
