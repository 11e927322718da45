use crate::error::AdvisorError;
use configuration::LlmSettings;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The request payload for an OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: String,
}

/// A minimal client for an OpenAI-compatible chat-completions API.
///
/// Which provider answers is purely a matter of configuration (base URL,
/// model name, key); nothing in this crate is provider-specific.
#[derive(Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl ChatClient {
    pub fn new(settings: &LlmSettings) -> Self {
        Self {
            client: reqwest::Client::builder()
                // Reasoning models can take minutes on a long context.
                .timeout(Duration::from_secs(300))
                .build()
                .expect("Failed to build reqwest client"),
            base_url: settings.base_url.clone(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        }
    }

    /// Sends one system + user exchange and returns the assistant's text.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String, AdvisorError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        tracing::debug!(model = %self.model, "Sending chat-completion request");
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(AdvisorError::Api(format!("{status}: {text}")));
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| AdvisorError::Api(format!("malformed completion response: {e}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(AdvisorError::EmptyResponse);
        }
        Ok(content)
    }
}
