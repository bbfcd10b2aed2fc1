//! Speech-to-text (STT) processing

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use super::wav::probe_wav;
use crate::config::{Config, SttProvider};
use crate::{Error, Result};

/// Default Deepgram API endpoint
pub const DEEPGRAM_BASE_URL: &str = "https://api.deepgram.com/v1";

/// Result of a recognition call
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
pub struct Recognition {
    pub text: String,
}

/// A speech-recognition capability
///
/// Implementations must be safe to call concurrently from many sessions.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Recognize speech in the audio file at `path`
    ///
    /// # Errors
    ///
    /// Returns error if the audio cannot be recognized
    async fn recognize(&self, path: &Path) -> Result<Recognition>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Transcribes speech to text
///
/// Each call spills the chunk to a temporary `.wav` file that is removed when
/// the call returns, whether or not recognition succeeded.
#[derive(Clone)]
pub struct Transcriber {
    recognizer: Arc<dyn SpeechRecognizer>,
}

impl Transcriber {
    /// Create a transcriber over a recognition capability
    #[must_use]
    pub fn new(recognizer: Arc<dyn SpeechRecognizer>) -> Self {
        Self { recognizer }
    }

    /// Build a transcriber for the configured STT provider
    ///
    /// Only the key that provider needs is required.
    ///
    /// # Errors
    ///
    /// Returns error if the provider's API key is missing
    pub fn from_config(config: &Config) -> Result<Self> {
        let keys = &config.api_keys;

        let recognizer: Arc<dyn SpeechRecognizer> = match config.stt.provider {
            SttProvider::Whisper => {
                let key = keys.openai.clone().ok_or_else(|| {
                    Error::Config("OPENAI_API_KEY is required for Whisper STT".to_string())
                })?;
                Arc::new(WhisperRecognizer::new(
                    key,
                    config.stt.model.clone(),
                    config.stt.base_url.clone(),
                )?)
            }
            SttProvider::Deepgram => {
                let key = keys.deepgram.clone().ok_or_else(|| {
                    Error::Config("DEEPGRAM_API_KEY is required for Deepgram STT".to_string())
                })?;
                Arc::new(
                    DeepgramRecognizer::new(key, config.stt.model.clone())?
                        .with_base_url(&config.stt.base_url),
                )
            }
        };

        Ok(Self::new(recognizer))
    }

    /// Name of the recognition provider
    #[must_use]
    pub fn provider(&self) -> &'static str {
        self.recognizer.name()
    }

    /// Transcribe audio to text
    ///
    /// # Arguments
    ///
    /// * `audio` - encoded audio bytes (WAV expected)
    ///
    /// # Errors
    ///
    /// Returns error if the temp file cannot be written or recognition fails
    pub async fn transcribe(&self, audio: &[u8]) -> Result<String> {
        match probe_wav(audio) {
            Some(info) => tracing::debug!(
                audio_bytes = audio.len(),
                channels = info.channels,
                sample_rate = info.sample_rate,
                duration_secs = info.duration_secs,
                "received WAV chunk"
            ),
            None => tracing::debug!(audio_bytes = audio.len(), "received non-WAV chunk"),
        }

        let tmp = tempfile::Builder::new()
            .prefix("voice-relay-")
            .suffix(".wav")
            .tempfile()?;
        tokio::fs::write(tmp.path(), audio).await?;

        let recognition = self.recognizer.recognize(tmp.path()).await?;
        let text = recognition.text.trim().to_string();

        tracing::info!(
            provider = self.recognizer.name(),
            transcript = %text,
            "transcription complete"
        );
        Ok(text)
    }
}

/// Response from Deepgram transcription API
#[derive(serde::Deserialize)]
struct DeepgramResponse {
    results: DeepgramResults,
}

#[derive(serde::Deserialize)]
struct DeepgramResults {
    channels: Vec<DeepgramChannel>,
}

#[derive(serde::Deserialize)]
struct DeepgramChannel {
    alternatives: Vec<DeepgramAlternative>,
}

#[derive(serde::Deserialize)]
struct DeepgramAlternative {
    transcript: String,
}

/// `OpenAI` Whisper (or any compatible `/audio/transcriptions` endpoint)
pub struct WhisperRecognizer {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
    base_url: String,
}

impl WhisperRecognizer {
    /// Create a Whisper recognizer
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn new(api_key: SecretString, model: String, base_url: String) -> Result<Self> {
        if api_key.expose_secret().is_empty() {
            return Err(Error::Config(
                "OpenAI API key required for Whisper".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl SpeechRecognizer for WhisperRecognizer {
    async fn recognize(&self, path: &Path) -> Result<Recognition> {
        let audio = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.wav")
            .to_string();

        tracing::debug!(audio_bytes = audio.len(), "starting Whisper transcription");

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(audio)
                    .file_name(file_name)
                    .mime_str("audio/wav")
                    .map_err(|e| Error::Stt(e.to_string()))?,
            )
            .text("model", self.model.clone());

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Whisper request failed");
                e
            })?;

        let status = response.status();
        tracing::debug!(status = %status, "received response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Whisper API error");
            return Err(Error::Stt(format!("Whisper API error {status}: {body}")));
        }

        let result: Recognition = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse response");
            e
        })?;

        Ok(result)
    }

    fn name(&self) -> &'static str {
        "whisper"
    }
}

/// Deepgram pre-recorded transcription
pub struct DeepgramRecognizer {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
    base_url: String,
}

impl DeepgramRecognizer {
    /// Create a Deepgram recognizer
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn new(api_key: SecretString, model: String) -> Result<Self> {
        if api_key.expose_secret().is_empty() {
            return Err(Error::Config("Deepgram API key required".to_string()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            base_url: DEEPGRAM_BASE_URL.to_string(),
        })
    }

    /// Point the recognizer at a different Deepgram-compatible endpoint
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl SpeechRecognizer for DeepgramRecognizer {
    async fn recognize(&self, path: &Path) -> Result<Recognition> {
        let audio = tokio::fs::read(path).await?;
        tracing::debug!(audio_bytes = audio.len(), "starting Deepgram transcription");

        let url = format!(
            "{}/listen?model={}&punctuate=true",
            self.base_url, self.model
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Token {}", self.api_key.expose_secret()))
            .header("Content-Type", "audio/wav")
            .body(audio)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Deepgram request failed");
                e
            })?;

        let status = response.status();
        tracing::debug!(status = %status, "received response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Deepgram API error");
            return Err(Error::Stt(format!("Deepgram API error {status}: {body}")));
        }

        let result: DeepgramResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse Deepgram response");
            e
        })?;

        let text = result
            .results
            .channels
            .first()
            .and_then(|c| c.alternatives.first())
            .map(|a| a.transcript.clone())
            .unwrap_or_default();

        Ok(Recognition { text })
    }

    fn name(&self) -> &'static str {
        "deepgram"
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Mutex;

    use super::*;

    /// Records the path it was handed and whether the file existed then
    struct RecordingRecognizer {
        reply: Result<String>,
        seen: Mutex<Option<(PathBuf, Vec<u8>)>>,
    }

    impl RecordingRecognizer {
        fn ok(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                seen: Mutex::new(None),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(Error::Stt("corrupt audio".to_string())),
                seen: Mutex::new(None),
            }
        }

        fn seen_path(&self) -> PathBuf {
            self.seen.lock().unwrap().as_ref().unwrap().0.clone()
        }
    }

    #[async_trait]
    impl SpeechRecognizer for RecordingRecognizer {
        async fn recognize(&self, path: &Path) -> Result<Recognition> {
            let contents = std::fs::read(path)?;
            *self.seen.lock().unwrap() = Some((path.to_path_buf(), contents));
            match &self.reply {
                Ok(text) => Ok(Recognition { text: text.clone() }),
                Err(e) => Err(Error::Stt(e.to_string())),
            }
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    #[tokio::test]
    async fn transcript_is_trimmed() {
        let recognizer = Arc::new(RecordingRecognizer::ok("  hello there \n"));
        let transcriber = Transcriber::new(recognizer);

        let text = transcriber.transcribe(b"RIFF....").await.unwrap();
        assert_eq!(text, "hello there");
    }

    #[tokio::test]
    async fn temp_file_holds_chunk_and_is_removed() {
        let recognizer = Arc::new(RecordingRecognizer::ok("hi"));
        let transcriber = Transcriber::new(recognizer.clone());

        transcriber.transcribe(b"chunk bytes").await.unwrap();

        let seen = recognizer.seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen.1, b"chunk bytes");
        assert_eq!(seen.0.extension().and_then(|e| e.to_str()), Some("wav"));
        assert!(!seen.0.exists());
    }

    #[tokio::test]
    async fn temp_file_is_removed_on_failure() {
        let recognizer = Arc::new(RecordingRecognizer::failing());
        let transcriber = Transcriber::new(recognizer.clone());

        let err = transcriber.transcribe(b"garbage").await.unwrap_err();
        assert!(matches!(err, Error::Stt(_)));
        assert!(!recognizer.seen_path().exists());
    }

    #[test]
    fn whisper_requires_key() {
        let result = WhisperRecognizer::new(
            SecretString::from(String::new()),
            "whisper-1".to_string(),
            "https://api.openai.com/v1".to_string(),
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn deepgram_requires_key() {
        let result = DeepgramRecognizer::new(SecretString::from(String::new()), "nova-2".into());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    fn config_with(pairs: &[(&str, &str)]) -> Config {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::resolve(crate::config::RelayConfigFile::default(), move |key| {
            pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
        })
        .unwrap()
    }

    #[test]
    fn from_config_builds_whisper_with_openai_key_only() {
        let config = config_with(&[("OPENAI_API_KEY", "sk")]);
        let transcriber = Transcriber::from_config(&config).unwrap();
        assert_eq!(transcriber.provider(), "whisper");
    }

    #[test]
    fn from_config_builds_deepgram() {
        let config = config_with(&[
            ("VOICE_RELAY_STT_PROVIDER", "deepgram"),
            ("DEEPGRAM_API_KEY", "dg"),
        ]);
        let transcriber = Transcriber::from_config(&config).unwrap();
        assert_eq!(transcriber.provider(), "deepgram");
    }

    #[test]
    fn from_config_reports_missing_key() {
        let config = config_with(&[("NEBIUS_API_KEY", "nb")]);
        assert!(matches!(
            Transcriber::from_config(&config),
            Err(Error::Config(msg)) if msg.contains("OPENAI_API_KEY")
        ));
    }
}
