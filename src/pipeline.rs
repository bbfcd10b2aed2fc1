//! The speech → text → reply → speech pipeline

use std::future::Future;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::llm::Responder;
use crate::voice::{Synthesizer, Transcriber};
use crate::{Error, Result};

/// The three stages, shared read-only by every session
#[derive(Clone)]
pub struct Pipeline {
    transcriber: Transcriber,
    responder: Responder,
    synthesizer: Synthesizer,
    stage_timeout: Option<Duration>,
}

impl Pipeline {
    /// Assemble a pipeline from its stages (no stage timeout)
    #[must_use]
    pub fn new(transcriber: Transcriber, responder: Responder, synthesizer: Synthesizer) -> Self {
        Self {
            transcriber,
            responder,
            synthesizer,
            stage_timeout: None,
        }
    }

    /// Bound each stage by `timeout`; `None` lets a stage run forever
    #[must_use]
    pub fn with_stage_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.stage_timeout = timeout;
        self
    }

    /// Build the pipeline from configuration, creating every capability client once
    ///
    /// # Errors
    ///
    /// Returns error if a selected provider has no API key
    pub fn from_config(config: &Config) -> Result<Self> {
        let pipeline = Self::new(
            Transcriber::from_config(config)?,
            Responder::from_config(config)?,
            Synthesizer::from_config(config)?,
        )
        .with_stage_timeout(config.server.stage_timeout);

        tracing::info!(
            stt = pipeline.transcriber().provider(),
            stt_model = %config.stt.model,
            llm_model = %config.llm.model,
            tts = pipeline.synthesizer().provider(),
            tts_model = %config.tts.model,
            "capability clients initialized"
        );

        Ok(pipeline)
    }

    /// Speech-to-text stage
    #[must_use]
    pub const fn transcriber(&self) -> &Transcriber {
        &self.transcriber
    }

    /// Chat stage
    #[must_use]
    pub const fn responder(&self) -> &Responder {
        &self.responder
    }

    /// Text-to-speech stage
    #[must_use]
    pub const fn synthesizer(&self) -> &Synthesizer {
        &self.synthesizer
    }

    /// Turn one inbound audio chunk into one reply audio chunk
    ///
    /// Stages run strictly one after another.
    ///
    /// # Errors
    ///
    /// Returns the first stage error, or `Error::Timeout` if a stage overruns
    pub async fn process(&self, audio: &[u8]) -> Result<Vec<u8>> {
        let started = Instant::now();

        let user_text = self
            .bounded("transcription", self.transcriber.transcribe(audio))
            .await?;
        let reply_text = self
            .bounded("chat", self.responder.respond(&user_text))
            .await?;
        let reply_audio = self
            .bounded("synthesis", self.synthesizer.synthesize(&reply_text))
            .await?;

        tracing::debug!(
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "pipeline complete"
        );
        Ok(reply_audio)
    }

    async fn bounded<T>(
        &self,
        stage: &'static str,
        fut: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        match self.stage_timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| Error::Timeout {
                    stage,
                    after: limit,
                })?,
            None => fut.await,
        }
    }
}
