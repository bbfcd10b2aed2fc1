//! Chat model access
//!
//! The relay asks exactly one question per utterance: a single user message,
//! greedy decoding, no history.

mod openai;
pub mod reasoning;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use openai::OpenAiCompatibleChat;
pub use reasoning::strip_reasoning;

use crate::config::Config;
use crate::{Error, Result};

/// One role-tagged chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    /// A `user`-role message
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Chat completion request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub temperature: f32,
    pub messages: Vec<ChatMessage>,
}

/// Chat completion response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

/// One completion choice
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChoiceMessage,
}

/// Message inside a completion choice
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatResponse {
    /// Response with a single choice carrying `content`
    #[must_use]
    pub fn single(content: impl Into<String>) -> Self {
        Self {
            choices: vec![ChatChoice {
                message: ChoiceMessage {
                    content: Some(content.into()),
                },
            }],
        }
    }
}

/// A language-model chat capability
///
/// Implementations must be safe to call concurrently from many sessions.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Run one chat completion
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response cannot be parsed
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Turns an utterance into a reply
#[derive(Clone)]
pub struct Responder {
    model: Arc<dyn ChatModel>,
    model_id: String,
}

impl Responder {
    /// Create a responder for `model_id`
    #[must_use]
    pub fn new(model: Arc<dyn ChatModel>, model_id: String) -> Self {
        Self { model, model_id }
    }

    /// Build a responder against the configured chat endpoint
    ///
    /// Uses `NEBIUS_API_KEY`, falling back to `OPENAI_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns error if neither key is set
    pub fn from_config(config: &Config) -> Result<Self> {
        let key = config.api_keys.chat().cloned().ok_or_else(|| {
            Error::Config("NEBIUS_API_KEY or OPENAI_API_KEY is required for chat".to_string())
        })?;
        let chat = Arc::new(OpenAiCompatibleChat::new(key, &config.llm.base_url)?);

        Ok(Self::new(chat, config.llm.model.clone()))
    }

    /// Model identifier sent with each request
    #[must_use]
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Ask the model to reply to `prompt`
    ///
    /// An empty prompt is sent as-is.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the model returns no choices
    pub async fn respond(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.model_id.clone(),
            temperature: 0.0,
            messages: vec![ChatMessage::user(prompt)],
        };

        tracing::debug!(
            provider = self.model.name(),
            model = %self.model_id,
            prompt_bytes = prompt.len(),
            "sending chat request"
        );

        let response = self.model.complete(&request).await?;
        let raw = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::Llm("response contained no choices".to_string()))?
            .message
            .content
            .unwrap_or_default();

        let reply = strip_reasoning(raw.trim());
        tracing::info!(reply = %reply, "chat complete");
        Ok(reply)
    }
}
