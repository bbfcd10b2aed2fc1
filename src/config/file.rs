//! TOML configuration file loading
//!
//! Supports `~/.config/voice-relay/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::Result;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct RelayConfigFile {
    /// Server/runtime configuration
    #[serde(default)]
    pub server: ServerFileConfig,

    /// Speech-to-text configuration
    #[serde(default)]
    pub stt: SttFileConfig,

    /// Language model configuration
    #[serde(default)]
    pub llm: LlmFileConfig,

    /// Text-to-speech configuration
    #[serde(default)]
    pub tts: TtsFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,
}

/// Server/runtime configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// Address to bind
    pub host: Option<String>,

    /// Port to listen on
    pub port: Option<u16>,

    /// Per-stage timeout in seconds (0 disables)
    pub stage_timeout_secs: Option<u64>,
}

/// Speech-to-text configuration
#[derive(Debug, Default, Deserialize)]
pub struct SttFileConfig {
    /// Provider ("whisper" or "deepgram")
    pub provider: Option<String>,

    /// Model (e.g. "whisper-1", "nova-2")
    pub model: Option<String>,

    /// Base URL for OpenAI-compatible transcription
    pub base_url: Option<String>,
}

/// LLM-related configuration
#[derive(Debug, Default, Deserialize)]
pub struct LlmFileConfig {
    /// Base URL of an OpenAI-compatible chat API
    pub base_url: Option<String>,

    /// Model identifier (e.g. "Qwen/Qwen3-30B-A3B-fast")
    pub model: Option<String>,
}

/// Text-to-speech configuration
#[derive(Debug, Default, Deserialize)]
pub struct TtsFileConfig {
    /// Provider ("elevenlabs" or "openai")
    pub provider: Option<String>,

    /// Voice identifier
    pub voice: Option<String>,

    /// Synthesis model
    pub model: Option<String>,

    /// Base URL for OpenAI-compatible synthesis
    pub base_url: Option<String>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    pub openai: Option<String>,
    pub nebius: Option<String>,
    pub elevenlabs: Option<String>,
    pub deepgram: Option<String>,
}

/// Parse config file contents
///
/// # Errors
///
/// Returns error if the contents are not valid TOML for this schema
pub fn parse_config_file(content: &str) -> Result<RelayConfigFile> {
    Ok(toml::from_str(content)?)
}

/// Load the TOML config file from `path`
///
/// Returns `RelayConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file(path: &Path) -> RelayConfigFile {
    if !path.exists() {
        return RelayConfigFile::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match parse_config_file(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                RelayConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            RelayConfigFile::default()
        }
    }
}

/// Return the default config file path: `~/.config/voice-relay/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("voice-relay").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_file() {
        let fc = parse_config_file(
            r#"
            [server]
            port = 9000

            [tts]
            voice = "custom-voice"
            "#,
        )
        .unwrap();

        assert_eq!(fc.server.port, Some(9000));
        assert!(fc.server.host.is_none());
        assert_eq!(fc.tts.voice.as_deref(), Some("custom-voice"));
        assert!(fc.llm.model.is_none());
    }

    #[test]
    fn empty_file_is_default() {
        let fc = parse_config_file("").unwrap();
        assert!(fc.server.port.is_none());
        assert!(fc.api_keys.openai.is_none());
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(parse_config_file("[server]\nport = \"not a number\"").is_err());
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let fc = load_config_file(&dir.path().join("absent.toml"));
        assert!(fc.server.port.is_none());
    }

    #[test]
    fn unparseable_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "this is = = not toml").unwrap();

        let fc = load_config_file(&path);
        assert!(fc.server.port.is_none());
    }
}
