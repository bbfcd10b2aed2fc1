//! Per-connection session loop
//!
//! A session is `Open` until the client goes away or any step fails, then
//! `Closed` for good. One inbound audio frame produces exactly one outbound
//! audio frame, and the next frame is not read until that reply is sent.

use async_trait::async_trait;

use crate::pipeline::Pipeline;
use crate::{Error, Result};

/// One frame read from the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A complete audio chunk
    Audio(Vec<u8>),
    /// A text frame (not part of the protocol)
    Text(String),
    /// Ping/pong; answered by the transport
    Control,
    /// Close frame or end of stream
    Closed,
}

/// The bidirectional stream a session runs over
#[async_trait]
pub trait AudioStream: Send {
    /// Wait for the next frame
    ///
    /// # Errors
    ///
    /// Returns error if reading from the transport fails
    async fn recv(&mut self) -> Result<Inbound>;

    /// Send one reply audio chunk
    ///
    /// # Errors
    ///
    /// Returns error if writing to the transport fails
    async fn send(&mut self, audio: Vec<u8>) -> Result<()>;

    /// Close the stream; failures are ignored
    async fn close(&mut self);
}

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Open,
    Closed,
}

/// What happened over a session's lifetime
#[derive(Debug)]
pub struct SessionSummary {
    /// Number of audio replies sent
    pub exchanges: u64,
    /// The failure that ended the session, if it did not end cleanly
    pub error: Option<Error>,
}

enum Step {
    Replied,
    Skipped,
    Ended,
}

/// Drive a session until it closes
///
/// Any error closes the stream without telling the client why.
pub async fn run_session<S: AudioStream>(stream: &mut S, pipeline: &Pipeline) -> SessionSummary {
    let mut state = SessionState::Open;
    let mut summary = SessionSummary {
        exchanges: 0,
        error: None,
    };

    while state == SessionState::Open {
        match step(stream, pipeline).await {
            Ok(Step::Replied) => summary.exchanges += 1,
            Ok(Step::Skipped) => {}
            Ok(Step::Ended) => {
                tracing::debug!("client closed the stream");
                state = SessionState::Closed;
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    capability = e.is_capability(),
                    "session failed, closing stream"
                );
                stream.close().await;
                summary.error = Some(e);
                state = SessionState::Closed;
            }
        }
    }

    tracing::info!(
        exchanges = summary.exchanges,
        failed = summary.error.is_some(),
        "session closed"
    );
    summary
}

async fn step<S: AudioStream>(stream: &mut S, pipeline: &Pipeline) -> Result<Step> {
    match stream.recv().await? {
        Inbound::Audio(audio) => {
            let reply = pipeline.process(&audio).await?;
            stream.send(reply).await?;
            Ok(Step::Replied)
        }
        Inbound::Control => Ok(Step::Skipped),
        Inbound::Closed => Ok(Step::Ended),
        Inbound::Text(text) => Err(Error::Protocol(format!(
            "expected binary audio frame, got {} bytes of text",
            text.len()
        ))),
    }
}
