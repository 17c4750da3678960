//! Live feed (SSE) and stats endpoints.
//!
//! Clients connect to `GET /feed` and receive a JSON-encoded
//! [`FeedMessage`] per SSE message: an initial `stats` snapshot and a
//! `connected` acknowledgment, then one `event` plus one `stats` message
//! for every mutation the engine accepts from that moment on. There is no
//! history replay.
//!
//! If a client falls behind the broadcast capacity, lagged messages are
//! silently skipped and the client resumes from the most recent one. The
//! subscription ends when the client disconnects and the stream (and its
//! receiver) is dropped.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use axum::Json;
use futures::stream::{self, Stream, StreamExt};
use tally_types::FeedMessage;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

use crate::state::AppState;

/// Upgrade the request to a server-sent-event stream of feed messages.
///
/// # Route
///
/// `GET /feed`
pub async fn feed(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    debug!("feed subscriber connected");

    // Subscribe before snapshotting stats: a mutation landing between the
    // two then shows up in the live stream instead of vanishing into the
    // gap. The receiver buffers until the stream is first polled.
    let rx = state.engine.subscribe();
    let stats = state.engine.stats().await;

    let initial = stream::iter([FeedMessage::Stats(stats), FeedMessage::Connected]);

    let live = BroadcastStream::new(rx).filter_map(|result| async move {
        match result {
            Ok(message) => Some(message),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                debug!(skipped, "feed subscriber lagged, skipping ahead");
                None
            }
        }
    });

    let messages = initial.chain(live).filter_map(|message| async move {
        match SseEvent::default().json_data(&message) {
            Ok(event) => Some(Ok::<SseEvent, Infallible>(event)),
            Err(error) => {
                warn!(%error, "failed to serialize feed message");
                None
            }
        }
    });

    Sse::new(messages).keep_alive(KeepAlive::default())
}

/// Return the current global totals.
///
/// # Route
///
/// `GET /stats`
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<tally_types::Stats> {
    Json(state.engine.stats().await)
}
