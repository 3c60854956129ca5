//! Chat model abstraction.
//!
//! Workflow steps and the research agent talk to the model through the
//! `ChatModel` trait; `AzureChatModel` is the production implementation.

mod azure;
mod types;

pub use azure::AzureChatModel;
pub use types::{ChatMessage, ModelReply, OutputSchema, ToolCallRequest, ToolDefinition};

use crate::error::{HealthBotError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// Trait for chat-completion models.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Complete a conversation, optionally offering tools to call.
    async fn complete(&self, messages: &[ChatMessage], tools: &[ToolDefinition])
        -> Result<ModelReply>;

    /// Complete a conversation whose answer must match `schema`.
    async fn complete_structured(
        &self,
        messages: &[ChatMessage],
        schema: &OutputSchema,
    ) -> Result<serde_json::Value>;

    /// Model or deployment name, for logging.
    fn name(&self) -> &str;
}

/// Send a single user prompt and return the text answer.
pub async fn ask(model: &dyn ChatModel, prompt: &str) -> Result<String> {
    let reply = model.complete(&[ChatMessage::user(prompt)], &[]).await?;
    reply
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| HealthBotError::OpenAI("Empty response from model".to_string()))
}

/// Send a single user prompt and parse the structured answer into `T`.
pub async fn ask_structured<T: DeserializeOwned>(
    model: &dyn ChatModel,
    prompt: &str,
    schema: &OutputSchema,
) -> Result<T> {
    let value = model
        .complete_structured(&[ChatMessage::user(prompt)], schema)
        .await?;
    serde_json::from_value(value).map_err(|e| {
        HealthBotError::OpenAI(format!(
            "Structured output does not match '{}': {}",
            schema.name, e
        ))
    })
}
