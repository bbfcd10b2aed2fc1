//! Error types for the voice relay

use thiserror::Error;

/// Result type alias for relay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the voice relay
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Speech-to-text error
    #[error("STT error: {0}")]
    Stt(String),

    /// Language model error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Text-to-speech error
    #[error("TTS error: {0}")]
    Tts(String),

    /// Audio error
    #[error("audio error: {0}")]
    Audio(String),

    /// A pipeline stage did not finish in time
    #[error("{stage} timed out after {after:?}")]
    Timeout {
        stage: &'static str,
        after: std::time::Duration,
    },

    /// WebSocket receive/send failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Client sent something other than a binary audio frame
    #[error("protocol error: {0}")]
    Protocol(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Whether the error came from one of the external capabilities
    /// (recognition, chat, synthesis) rather than the relay itself
    #[must_use]
    pub const fn is_capability(&self) -> bool {
        matches!(
            self,
            Self::Stt(_)
                | Self::Llm(_)
                | Self::Tts(_)
                | Self::Timeout { .. }
                | Self::Http(_)
                | Self::Serialization(_)
        )
    }
}
