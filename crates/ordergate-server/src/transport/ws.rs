//! WebSocket broadcast endpoint.
//!
//! Responsibilities:
//! - Upgrade HTTP -> WS (refused with 503 while draining)
//! - Cap message size at `gateway.max_frame_bytes`
//! - Adapt the socket to `BroadcastStream` and run the handler
//! - Close the socket once the handler returns

use async_trait::async_trait;
use axum::{
    extract::{ws::Message, ws::WebSocket, ws::WebSocketUpgrade, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::Instrument;

use ordergate_core::error::{OrderGateError, Result};
use ordergate_core::protocol::envelope::Envelope;
use ordergate_core::protocol::status::BroadcastResponse;

use crate::app_state::AppState;
use crate::broadcast::BroadcastStream;
use crate::transport::codec::{decode, Inbound};

/// `BroadcastStream` over an upgraded WebSocket.
pub struct WsBroadcastStream {
    socket: WebSocket,
}

impl WsBroadcastStream {
    pub fn new(socket: WebSocket) -> Self {
        Self { socket }
    }

    /// Best-effort close; the peer may already be gone.
    pub async fn close(mut self) {
        let _ = self.socket.send(Message::Close(None)).await;
    }
}

#[async_trait]
impl BroadcastStream for WsBroadcastStream {
    async fn recv(&mut self) -> Result<Option<Envelope>> {
        loop {
            let Some(incoming) = self.socket.recv().await else {
                return Ok(None);
            };
            let msg =
                incoming.map_err(|e| OrderGateError::Transport(format!("receive failed: {e}")))?;

            match decode(msg)? {
                Inbound::Envelope(env) => return Ok(Some(env)),
                // pongs are queued by the websocket layer itself
                Inbound::Ping | Inbound::Pong => continue,
                Inbound::Close => return Ok(None),
            }
        }
    }

    async fn send(&mut self, resp: BroadcastResponse) -> Result<()> {
        self.socket
            .send(Message::Text(resp.to_json()))
            .await
            .map_err(|e| OrderGateError::Transport(format!("send failed: {e}")))
    }
}

// --------------------
// Entry
// --------------------
pub async fn ws_upgrade(State(app): State<AppState>, ws: WebSocketUpgrade) -> Response {
    if app.is_draining() {
        return (StatusCode::SERVICE_UNAVAILABLE, "draining").into_response();
    }

    let max = app.cfg().gateway.max_frame_bytes;
    ws.max_message_size(max)
        .max_frame_size(max)
        .on_upgrade(move |socket| run_session(app, socket))
}

async fn run_session(app: AppState, socket: WebSocket) {
    let session = app.next_session_id();
    let span = tracing::info_span!("broadcast", session);

    async move {
        tracing::debug!("broadcast stream opened");
        let mut stream = WsBroadcastStream::new(socket);

        match app.handler().handle(&mut stream).await {
            Ok(()) => tracing::debug!("broadcast stream finished"),
            Err(e) => tracing::debug!(error = %e, "broadcast stream aborted"),
        }

        stream.close().await;
    }
    .instrument(span)
    .await
}
