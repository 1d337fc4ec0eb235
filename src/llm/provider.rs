//! Chat provider trait: the common interface chat backends implement.

use async_trait::async_trait;
use serde_json::Value;

pub use crate::llm::openai::{ChatReply, Message, MessageContent, ToolCallRequest};

// ── Common Parameters ──────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct LlmParams {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f32>,
    pub frequency_penalty: Option<f32>,
    pub presence_penalty: Option<f32>,
    pub stop: Option<Vec<String>>,
}

/// Common interface for chat-completion providers.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Non-streaming chat completion carrying the full tool catalog.
    async fn chat(
        &self,
        messages: Vec<Message>,
        tools: Vec<Value>,
        options: Option<LlmParams>,
    ) -> Result<ChatReply, String>;

    /// Provider identifier (e.g. "openai").
    fn id(&self) -> &str;
}

// ── OpenAI adapter ─────────────────────────────────────

use crate::llm::openai::OpenAIClient;

/// Wraps [`OpenAIClient`] (or any OpenAI-compatible endpoint) as a
/// [`ChatProvider`].
pub struct OpenAIProvider {
    client: OpenAIClient,
    provider_id: String,
}

impl OpenAIProvider {
    pub fn new(api_key: String, base_url: Option<String>, model: Option<String>) -> Self {
        Self {
            client: OpenAIClient::new(api_key, base_url, model),
            provider_id: "openai".to_string(),
        }
    }

    pub fn with_id(mut self, id: String) -> Self {
        self.provider_id = id;
        self
    }
}

#[async_trait]
impl ChatProvider for OpenAIProvider {
    async fn chat(
        &self,
        messages: Vec<Message>,
        tools: Vec<Value>,
        options: Option<LlmParams>,
    ) -> Result<ChatReply, String> {
        self.client.chat(messages, tools, options).await
    }

    fn id(&self) -> &str {
        &self.provider_id
    }
}
