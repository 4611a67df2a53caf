//! Streaming session handler: one `ready` handshake, then periodic pings.
//!
//! A session walks Connecting -> Ready -> Streaming -> Closed. The handshake
//! event is emitted exactly once, before any ping, and carries the full
//! serialized tool catalog so a caller can construct valid invocations from
//! the stream alone. Invocations themselves travel over `POST /invoke`, not
//! this stream, so heartbeats never block on an in-flight action.

use axum::extract::State;
use axum::response::sse::{Event, Sse};
use chrono::Utc;
use futures::stream::{self, Stream, StreamExt};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_stream::wrappers::IntervalStream;
use uuid::Uuid;

use crate::state::AppState;

/// Protocol identifier advertised in the handshake.
pub const PROTOCOL_VERSION: &str = "mcp/1.0";

/// Logs session teardown when the stream is dropped, which axum does as
/// soon as the peer disconnects or the process shuts down. Dropping the
/// stream also cancels the heartbeat interval, so no timer outlives the
/// connection.
struct SessionLifecycle {
    id: Uuid,
    connected_at: Instant,
}

impl Drop for SessionLifecycle {
    fn drop(&mut self) {
        tracing::info!(
            session_id = %self.id,
            elapsed_secs = self.connected_at.elapsed().as_secs(),
            "streaming session closed"
        );
    }
}

/// GET /sse - Long-lived event stream.
pub async fn sse_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let session_id = Uuid::new_v4();
    tracing::info!(session_id = %session_id, "streaming session connecting");

    let handshake = json!({
        "protocol": PROTOCOL_VERSION,
        "server": {
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        },
        "tools": &state.catalog,
        "timestamp": Utc::now().to_rfc3339(),
    });

    let ready = stream::once(async move {
        tracing::debug!(session_id = %session_id, "handshake emitted, session streaming");
        Event::default().event("ready").json_data(&handshake)
    });

    let lifecycle = SessionLifecycle {
        id: session_id,
        connected_at: Instant::now(),
    };

    // First tick fires immediately, so a ping follows the handshake right
    // away and then every heartbeat interval.
    let interval = tokio::time::interval(Duration::from_secs(state.config.heartbeat_secs.max(1)));
    let pings = IntervalStream::new(interval).map(move |_| {
        let _keepalive = &lifecycle;
        Event::default().event("ping").json_data(&json!({
            "timestamp": Utc::now().to_rfc3339(),
            "status": "ok",
        }))
    });

    Sse::new(ready.chain(pings))
}
