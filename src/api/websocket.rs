//! WebSocket handler for the audio relay

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::IntoResponse,
    routing::get,
};
use tracing::Instrument;

use crate::pipeline::Pipeline;
use crate::session::{AudioStream, Inbound, run_session};
use crate::{Error, Result};

/// Build WebSocket router
pub fn router(pipeline: Arc<Pipeline>) -> Router {
    Router::new()
        .route("/audio", get(ws_upgrade))
        .with_state(pipeline)
}

/// Handle WebSocket upgrade request
async fn ws_upgrade(
    State(pipeline): State<Arc<Pipeline>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, pipeline))
}

/// Handle WebSocket connection
async fn handle_socket(socket: WebSocket, pipeline: Arc<Pipeline>) {
    let session_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("session", id = %session_id);

    async move {
        tracing::info!("WebSocket connected");
        let mut stream = WsAudioStream { socket };
        run_session(&mut stream, &pipeline).await;
    }
    .instrument(span)
    .await;
}

/// Adapts an axum `WebSocket` to the session loop
struct WsAudioStream {
    socket: WebSocket,
}

#[async_trait]
impl AudioStream for WsAudioStream {
    async fn recv(&mut self) -> Result<Inbound> {
        match self.socket.recv().await {
            Some(Ok(Message::Binary(bytes))) => Ok(Inbound::Audio(bytes.to_vec())),
            Some(Ok(Message::Text(text))) => Ok(Inbound::Text(text.as_str().to_string())),
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => Ok(Inbound::Control),
            Some(Ok(Message::Close(_))) | None => Ok(Inbound::Closed),
            Some(Err(e)) => Err(Error::Transport(format!("receive failed: {e}"))),
        }
    }

    async fn send(&mut self, audio: Vec<u8>) -> Result<()> {
        self.socket
            .send(Message::Binary(audio.into()))
            .await
            .map_err(|e| Error::Transport(e.to_string()))
    }

    async fn close(&mut self) {
        if let Err(e) = self.socket.send(Message::Close(None)).await {
            tracing::debug!(error = %e, "failed to send close frame");
        }
    }
}
