// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Live session notifications over WebSocket.
//!
//! Events are facts about what changed in a session, published after the
//! session actor has applied a transition. They are never authoritative and
//! no commands are accepted over the socket; clients re-read the session
//! snapshot over HTTP for the real state.

use axum::{
    extract::{
        WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use eudr_declare::WizardStep;
use eudr_declare_domain::DeclarationStatus;
use futures::{SinkExt, stream::StreamExt};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Maximum number of events to buffer in the broadcast channel.
/// Slow clients lose the oldest events.
const EVENT_BUFFER_SIZE: usize = 256;

/// A notification about one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum LiveEvent {
    /// Sent once when a client connects.
    Connected {
        session_id: String,
        /// Server timestamp (ISO 8601).
        timestamp: String,
    },
    /// The wizard moved to another step.
    StepChanged {
        session_id: String,
        step_index: u8,
        step: WizardStep,
    },
    /// The geo pipeline changed state.
    GeoStateChanged {
        session_id: String,
        /// State name, e.g. `checking_satellite`.
        state: &'static str,
        /// The run in flight, absent in terminal states.
        run: Option<u64>,
        file_name: Option<String>,
    },
    /// The declaration was stored and the session reset.
    Submitted {
        session_id: String,
        declaration_id: String,
        status: DeclarationStatus,
    },
    /// The session was closed.
    SessionClosed { session_id: String },
}

impl LiveEvent {
    /// The session the event is about.
    #[must_use]
    pub fn session_id(&self) -> &str {
        match self {
            Self::Connected { session_id, .. }
            | Self::StepChanged { session_id, .. }
            | Self::GeoStateChanged { session_id, .. }
            | Self::Submitted { session_id, .. }
            | Self::SessionClosed { session_id } => session_id,
        }
    }
}

/// Fan-out of live events to every connected client.
#[derive(Clone)]
pub struct LiveEventBroadcaster {
    tx: broadcast::Sender<LiveEvent>,
}

impl LiveEventBroadcaster {
    /// Creates a broadcaster with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_BUFFER_SIZE);
        Self { tx }
    }

    /// Publishes an event. Dropped silently if nobody listens.
    pub fn broadcast(&self, event: &LiveEvent) {
        match self.tx.send(event.clone()) {
            Ok(count) => {
                debug!(?event, receivers = count, "Broadcast live event");
            }
            Err(_) => {
                debug!(?event, "No receivers for live event");
            }
        }
    }

    /// Subscribes to all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<LiveEvent> {
        self.tx.subscribe()
    }
}

impl Default for LiveEventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Upgrades the connection and streams the events of one session.
pub fn upgrade(
    ws: WebSocketUpgrade,
    session_id: String,
    broadcaster: LiveEventBroadcaster,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, session_id, broadcaster))
}

async fn handle_socket(socket: WebSocket, session_id: String, broadcaster: LiveEventBroadcaster) {
    info!(%session_id, "Client connected to live session stream");

    let (mut sender, mut receiver) = socket.split();
    let mut rx: broadcast::Receiver<LiveEvent> = broadcaster.subscribe();

    let connected: LiveEvent = LiveEvent::Connected {
        session_id: session_id.clone(),
        timestamp: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Iso8601::DEFAULT)
            .unwrap_or_else(|_| String::from("unknown")),
    };

    if let Ok(json) = serde_json::to_string(&connected)
        && sender.send(Message::Text(json.into())).await.is_err()
    {
        warn!(%session_id, "Failed to send connection confirmation");
        return;
    }

    let filter_id: String = session_id.clone();
    let mut send_task = tokio::spawn(async move {
        loop {
            let event: LiveEvent = match rx.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Live client lagging, events dropped");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };
            if event.session_id() != filter_id {
                continue;
            }
            let closing: bool = matches!(event, LiveEvent::SessionClosed { .. });
            match serde_json::to_string(&event) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    error!(?e, "Failed to serialize live event");
                }
            }
            if closing {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(_) | Message::Binary(_)) => {
                    warn!("Received unexpected message from client, ignoring");
                }
                Ok(Message::Close(_)) => {
                    debug!("Client sent close frame");
                    break;
                }
                Ok(Message::Ping(_) | Message::Pong(_)) => {}
                Err(e) => {
                    error!(?e, "WebSocket receive error");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => {
            debug!("Send task completed");
            recv_task.abort();
        }
        _ = &mut recv_task => {
            debug!("Receive task completed");
            send_task.abort();
        }
    }

    info!(%session_id, "Client disconnected from live session stream");
}
