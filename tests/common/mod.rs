//! Shared test utilities
#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::net::TcpListener;
use voice_relay::api::ApiServer;
use voice_relay::llm::{ChatRequest, ChatResponse};
use voice_relay::voice::{Recognition, SpeechRequest, probe_wav, samples_to_wav};
use voice_relay::{
    ChatModel, Error, Pipeline, Responder, Result, SpeechRecognizer, SpeechSynthesizer,
    Synthesizer, Transcriber,
};

/// Recognizer that hears the same words in every chunk
pub struct FixedRecognizer(pub &'static str);

#[async_trait]
impl SpeechRecognizer for FixedRecognizer {
    async fn recognize(&self, _path: &Path) -> Result<Recognition> {
        Ok(Recognition {
            text: self.0.to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Recognizer that "hears" the raw chunk bytes as UTF-8 text
pub struct LiteralRecognizer;

#[async_trait]
impl SpeechRecognizer for LiteralRecognizer {
    async fn recognize(&self, path: &Path) -> Result<Recognition> {
        let bytes = tokio::fs::read(path).await?;
        Ok(Recognition {
            text: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }

    fn name(&self) -> &'static str {
        "literal"
    }
}

/// Recognizer that reports the WAV header of the chunk it was handed
pub struct ProbingRecognizer;

#[async_trait]
impl SpeechRecognizer for ProbingRecognizer {
    async fn recognize(&self, path: &Path) -> Result<Recognition> {
        let bytes = tokio::fs::read(path).await?;
        let info = probe_wav(&bytes).ok_or_else(|| Error::Audio("not a WAV".to_string()))?;
        Ok(Recognition {
            text: format!("{} ch {} Hz", info.channels, info.sample_rate),
        })
    }

    fn name(&self) -> &'static str {
        "probing"
    }
}

/// Chat model that always returns the same completion
pub struct CannedChat(pub &'static str);

#[async_trait]
impl ChatModel for CannedChat {
    async fn complete(&self, _request: &ChatRequest) -> Result<ChatResponse> {
        Ok(ChatResponse::single(self.0))
    }

    fn name(&self) -> &'static str {
        "canned"
    }
}

/// Chat model that answers with "reply to <prompt>"
pub struct ParrotChat;

#[async_trait]
impl ChatModel for ParrotChat {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let prompt = request
            .messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or_default();
        Ok(ChatResponse::single(format!("reply to {prompt}")))
    }

    fn name(&self) -> &'static str {
        "parrot"
    }
}

/// Chat model that always fails
pub struct FailingChat;

#[async_trait]
impl ChatModel for FailingChat {
    async fn complete(&self, _request: &ChatRequest) -> Result<ChatResponse> {
        Err(Error::Llm("upstream unavailable".to_string()))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Synthesizer whose "audio" is the reply text itself
pub struct EchoSynth;

#[async_trait]
impl SpeechSynthesizer for EchoSynth {
    async fn synthesize(&self, request: &SpeechRequest<'_>) -> Result<Vec<u8>> {
        Ok(request.text.as_bytes().to_vec())
    }

    fn name(&self) -> &'static str {
        "echo"
    }
}

/// Build a pipeline from mock capabilities
pub fn test_pipeline(
    recognizer: Arc<dyn SpeechRecognizer>,
    chat: Arc<dyn ChatModel>,
) -> Arc<Pipeline> {
    Arc::new(Pipeline::new(
        Transcriber::new(recognizer),
        Responder::new(chat, "test-model".to_string()),
        Synthesizer::new(Arc::new(EchoSynth), "test-voice".to_string(), "test-tts".to_string()),
    ))
}

/// A short 16 kHz mono WAV utterance (a 440 Hz tone)
pub fn wav_fixture(duration_secs: f32) -> Vec<u8> {
    const SAMPLE_RATE: u32 = 16_000;
    let num_samples = (SAMPLE_RATE as f32 * duration_secs) as usize;
    let samples: Vec<f32> = (0..num_samples)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            0.5 * (2.0 * std::f32::consts::PI * 440.0 * t).sin()
        })
        .collect();
    samples_to_wav(&samples, SAMPLE_RATE).expect("failed to encode WAV fixture")
}

/// Serve `app` on an ephemeral local port and return its address
pub async fn spawn_app(app: axum::Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind test listener");
    let addr = listener.local_addr().expect("no local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server failed");
    });

    addr.to_string()
}

/// Start the relay server on an ephemeral port and return its address
pub async fn start_relay(pipeline: Arc<Pipeline>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind test listener");
    let addr = listener.local_addr().expect("no local addr").to_string();

    let server = ApiServer::new(pipeline, addr.clone());
    tokio::spawn(async move {
        server.serve(listener).await.expect("relay server failed");
    });

    addr
}
