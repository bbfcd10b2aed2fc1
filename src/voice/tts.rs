//! Text-to-speech (TTS) processing

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::config::{Config, TtsProvider};
use crate::{Error, Result};

/// Default `ElevenLabs` API endpoint
pub const ELEVENLABS_BASE_URL: &str = "https://api.elevenlabs.io/v1";

/// One synthesis request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeechRequest<'a> {
    pub text: &'a str,
    pub voice: &'a str,
    pub model: &'a str,
}

/// A text-to-speech capability
///
/// Implementations must be safe to call concurrently from many sessions.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize speech and return the encoded audio bytes
    ///
    /// # Errors
    ///
    /// Returns error if synthesis fails
    async fn synthesize(&self, request: &SpeechRequest<'_>) -> Result<Vec<u8>>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Synthesizes speech from text with a fixed voice and model
#[derive(Clone)]
pub struct Synthesizer {
    backend: Arc<dyn SpeechSynthesizer>,
    voice: String,
    model: String,
}

impl Synthesizer {
    /// Create a synthesizer bound to one voice and model
    #[must_use]
    pub fn new(backend: Arc<dyn SpeechSynthesizer>, voice: String, model: String) -> Self {
        Self {
            backend,
            voice,
            model,
        }
    }

    /// Build a synthesizer for the configured TTS provider, voice and model
    ///
    /// # Errors
    ///
    /// Returns error if the provider's API key is missing
    pub fn from_config(config: &Config) -> Result<Self> {
        let keys = &config.api_keys;

        let backend: Arc<dyn SpeechSynthesizer> = match config.tts.provider {
            TtsProvider::ElevenLabs => {
                let key = keys.elevenlabs.clone().ok_or_else(|| {
                    Error::Config("ELEVENLABS_API_KEY is required for ElevenLabs TTS".to_string())
                })?;
                Arc::new(ElevenLabsSynthesizer::new(key)?.with_base_url(&config.tts.base_url))
            }
            TtsProvider::OpenAI => {
                let key = keys.openai.clone().ok_or_else(|| {
                    Error::Config("OPENAI_API_KEY is required for OpenAI TTS".to_string())
                })?;
                Arc::new(OpenAiSynthesizer::new(key, &config.tts.base_url)?)
            }
        };

        Ok(Self::new(
            backend,
            config.tts.voice.clone(),
            config.tts.model.clone(),
        ))
    }

    /// Name of the synthesis provider
    #[must_use]
    pub fn provider(&self) -> &'static str {
        self.backend.name()
    }

    /// Synthesize text to speech
    ///
    /// # Returns
    ///
    /// Audio bytes exactly as the backend produced them
    ///
    /// # Errors
    ///
    /// Returns error if synthesis fails
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let request = SpeechRequest {
            text,
            voice: &self.voice,
            model: &self.model,
        };

        let audio = self.backend.synthesize(&request).await?;
        tracing::info!(
            provider = self.backend.name(),
            text_bytes = text.len(),
            audio_bytes = audio.len(),
            "synthesis complete"
        );
        Ok(audio)
    }
}

/// `ElevenLabs` text-to-speech
pub struct ElevenLabsSynthesizer {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl ElevenLabsSynthesizer {
    /// Create an `ElevenLabs` synthesizer
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn new(api_key: SecretString) -> Result<Self> {
        if api_key.expose_secret().is_empty() {
            return Err(Error::Config(
                "ElevenLabs API key required for TTS".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: ELEVENLABS_BASE_URL.to_string(),
        })
    }

    /// Point the synthesizer at a different ElevenLabs-compatible endpoint
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsSynthesizer {
    async fn synthesize(&self, request: &SpeechRequest<'_>) -> Result<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct ElevenLabsRequest<'a> {
            text: &'a str,
            model_id: &'a str,
        }

        let url = format!("{}/text-to-speech/{}", self.base_url, request.voice);

        let body = ElevenLabsRequest {
            text: request.text,
            model_id: request.model,
        };

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", self.api_key.expose_secret())
            .header("Accept", "audio/mpeg")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Tts(format!("ElevenLabs TTS error {status}: {body}")));
        }

        let audio = response.bytes().await?;
        Ok(audio.to_vec())
    }

    fn name(&self) -> &'static str {
        "elevenlabs"
    }
}

/// `OpenAI` (or compatible `/audio/speech`) text-to-speech
pub struct OpenAiSynthesizer {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl OpenAiSynthesizer {
    /// Create an `OpenAI` synthesizer
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn new(api_key: SecretString, base_url: &str) -> Result<Self> {
        if api_key.expose_secret().is_empty() {
            return Err(Error::Config("OpenAI API key required for TTS".to_string()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSynthesizer {
    async fn synthesize(&self, request: &SpeechRequest<'_>) -> Result<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct TtsRequest<'a> {
            model: &'a str,
            input: &'a str,
            voice: &'a str,
        }

        let body = TtsRequest {
            model: request.model,
            input: request.text,
            voice: request.voice,
        };

        let response = self
            .client
            .post(format!("{}/audio/speech", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Tts(format!("OpenAI TTS error {status}: {body}")));
        }

        let audio = response.bytes().await?;
        Ok(audio.to_vec())
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
