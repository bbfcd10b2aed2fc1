//! OpenAI-compatible chat completions (Nebius AI Studio, `OpenAI`, vLLM, ...)

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};

use super::{ChatModel, ChatRequest, ChatResponse};
use crate::{Error, Result};

/// Chat client for any `/chat/completions` endpoint
pub struct OpenAiCompatibleChat {
    client: Client,
    api_key: SecretString,
    base_url: String,
}

impl OpenAiCompatibleChat {
    /// Create a chat client
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn new(api_key: SecretString, base_url: &str) -> Result<Self> {
        if api_key.expose_secret().is_empty() {
            return Err(Error::Config(
                "API key required for chat completions".to_string(),
            ));
        }

        Ok(Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ChatModel for OpenAiCompatibleChat {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(request)
            .send()
            .await
            .map_err(|e| Error::Llm(format!("chat request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Llm(format!("chat API error: {status} - {body}")));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Llm(format!("failed to parse chat response: {e}")))
    }

    fn name(&self) -> &'static str {
        "openai-compatible"
    }
}
