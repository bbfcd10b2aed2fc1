//! Configuration management for the voice relay
//!
//! Every setting resolves as env > TOML file > default, once at startup.

pub mod file;

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::voice::stt::DEEPGRAM_BASE_URL;
use crate::voice::tts::ELEVENLABS_BASE_URL;
use crate::{Error, Result};
pub use file::RelayConfigFile;

/// Default Nebius AI Studio endpoint (OpenAI-compatible)
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.studio.nebius.com/v1";

/// Default chat model
pub const DEFAULT_LLM_MODEL: &str = "Qwen/Qwen3-30B-A3B-fast";

/// Default OpenAI API endpoint for Whisper and OpenAI TTS
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// ElevenLabs voice id for "Rachel"
pub const DEFAULT_ELEVENLABS_VOICE: &str = "21m00Tcm4TlvDq8hWzrm";

/// Default ElevenLabs synthesis model
pub const DEFAULT_ELEVENLABS_MODEL: &str = "eleven_multilingual_v2";

/// Default stage timeout in seconds
pub const DEFAULT_STAGE_TIMEOUT_SECS: u64 = 120;

/// Voice relay configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Speech-to-text configuration
    pub stt: SttConfig,

    /// Chat model configuration
    pub llm: LlmConfig,

    /// Text-to-speech configuration
    pub tts: TtsConfig,

    /// API keys
    pub api_keys: ApiKeys,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Upper bound on any single pipeline stage; `None` waits forever
    pub stage_timeout: Option<Duration>,
}

/// Speech recognition backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SttProvider {
    /// OpenAI-compatible `/audio/transcriptions`
    Whisper,
    /// Deepgram `/v1/listen`
    Deepgram,
}

impl FromStr for SttProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "whisper" | "openai" => Ok(Self::Whisper),
            "deepgram" => Ok(Self::Deepgram),
            other => Err(Error::Config(format!("unknown STT provider: {other}"))),
        }
    }
}

/// Speech synthesis backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtsProvider {
    /// ElevenLabs `/v1/text-to-speech/{voice}`
    ElevenLabs,
    /// OpenAI-compatible `/audio/speech`
    OpenAI,
}

impl FromStr for TtsProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "elevenlabs" | "eleven_labs" => Ok(Self::ElevenLabs),
            "openai" => Ok(Self::OpenAI),
            other => Err(Error::Config(format!("unknown TTS provider: {other}"))),
        }
    }
}

/// Speech-to-text configuration
#[derive(Debug, Clone)]
pub struct SttConfig {
    pub provider: SttProvider,
    pub model: String,
    pub base_url: String,
}

/// Chat model configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
}

/// Text-to-speech configuration
#[derive(Debug, Clone)]
pub struct TtsConfig {
    pub provider: TtsProvider,
    pub voice: String,
    pub model: String,
    pub base_url: String,
}

/// API keys for external services
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// `OpenAI` API key (Whisper, OpenAI TTS, chat fallback)
    pub openai: Option<SecretString>,

    /// Nebius AI Studio API key (chat)
    pub nebius: Option<SecretString>,

    /// `ElevenLabs` API key (TTS)
    pub elevenlabs: Option<SecretString>,

    /// `Deepgram` API key (STT)
    pub deepgram: Option<SecretString>,
}

impl ApiKeys {
    /// Key used for the chat model: Nebius first, then `OpenAI`
    #[must_use]
    pub fn chat(&self) -> Option<&SecretString> {
        match &self.nebius {
            Some(key) => Some(key),
            None => self.openai.as_ref(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment and the config file
    ///
    /// The file path is `VOICE_RELAY_CONFIG` if set, otherwise
    /// `~/.config/voice-relay/config.toml`.
    ///
    /// # Errors
    ///
    /// Returns error if a setting has an invalid value
    pub fn load() -> Result<Self> {
        let path = std::env::var("VOICE_RELAY_CONFIG")
            .ok()
            .map(PathBuf::from)
            .or_else(file::config_file_path);

        let fc = path
            .as_deref()
            .map(file::load_config_file)
            .unwrap_or_default();

        Self::resolve(fc, |key| std::env::var(key).ok())
    }

    /// Resolve configuration from a parsed config file and an env lookup
    ///
    /// # Errors
    ///
    /// Returns error if a setting has an invalid value
    pub fn resolve<F>(fc: RelayConfigFile, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_nonempty = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let port = match env_nonempty("VOICE_RELAY_PORT").or_else(|| env_nonempty("PORT")) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("invalid port: {raw}")))?,
            None => fc.server.port.unwrap_or(8000),
        };

        let timeout_secs = match env_nonempty("VOICE_RELAY_STAGE_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("invalid stage timeout: {raw}")))?,
            None => fc
                .server
                .stage_timeout_secs
                .unwrap_or(DEFAULT_STAGE_TIMEOUT_SECS),
        };

        let server = ServerConfig {
            host: env_nonempty("VOICE_RELAY_HOST")
                .or(fc.server.host)
                .unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            stage_timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
        };

        let stt_provider = env_nonempty("VOICE_RELAY_STT_PROVIDER")
            .or(fc.stt.provider)
            .map_or(Ok(SttProvider::Whisper), |s| s.parse())?;
        let stt = SttConfig {
            provider: stt_provider,
            model: env_nonempty("VOICE_RELAY_STT_MODEL")
                .or(fc.stt.model)
                .unwrap_or_else(|| match stt_provider {
                    SttProvider::Whisper => "whisper-1".to_string(),
                    SttProvider::Deepgram => "nova-2".to_string(),
                }),
            base_url: env_nonempty("VOICE_RELAY_STT_BASE_URL")
                .or(fc.stt.base_url)
                .unwrap_or_else(|| match stt_provider {
                    SttProvider::Whisper => DEFAULT_OPENAI_BASE_URL.to_string(),
                    SttProvider::Deepgram => DEEPGRAM_BASE_URL.to_string(),
                }),
        };

        let llm = LlmConfig {
            base_url: env_nonempty("VOICE_RELAY_LLM_BASE_URL")
                .or(fc.llm.base_url)
                .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
            model: env_nonempty("VOICE_RELAY_LLM_MODEL")
                .or(fc.llm.model)
                .unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
        };

        let tts_provider = env_nonempty("VOICE_RELAY_TTS_PROVIDER")
            .or(fc.tts.provider)
            .map_or(Ok(TtsProvider::ElevenLabs), |s| s.parse())?;
        let (default_voice, default_model) = match tts_provider {
            TtsProvider::ElevenLabs => (DEFAULT_ELEVENLABS_VOICE, DEFAULT_ELEVENLABS_MODEL),
            TtsProvider::OpenAI => ("alloy", "tts-1"),
        };
        let tts = TtsConfig {
            provider: tts_provider,
            voice: env_nonempty("VOICE_RELAY_TTS_VOICE")
                .or(fc.tts.voice)
                .unwrap_or_else(|| default_voice.to_string()),
            model: env_nonempty("VOICE_RELAY_TTS_MODEL")
                .or(fc.tts.model)
                .unwrap_or_else(|| default_model.to_string()),
            base_url: env_nonempty("VOICE_RELAY_TTS_BASE_URL")
                .or(fc.tts.base_url)
                .unwrap_or_else(|| match tts_provider {
                    TtsProvider::ElevenLabs => ELEVENLABS_BASE_URL.to_string(),
                    TtsProvider::OpenAI => DEFAULT_OPENAI_BASE_URL.to_string(),
                }),
        };

        // API keys (env > toml > None)
        let api_keys = ApiKeys {
            openai: env_nonempty("OPENAI_API_KEY")
                .or(fc.api_keys.openai)
                .map(SecretString::from),
            nebius: env_nonempty("NEBIUS_API_KEY")
                .or(fc.api_keys.nebius)
                .map(SecretString::from),
            elevenlabs: env_nonempty("ELEVENLABS_API_KEY")
                .or(fc.api_keys.elevenlabs)
                .map(SecretString::from),
            deepgram: env_nonempty("DEEPGRAM_API_KEY")
                .or(fc.api_keys.deepgram)
                .map(SecretString::from),
        };

        Ok(Self {
            server,
            stt,
            llm,
            tts,
            api_keys,
        })
    }

    /// Socket address string for the HTTP server
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
