//! Azure OpenAI chat model.

use super::{ChatMessage, ChatModel, ModelReply, OutputSchema, ToolCallRequest, ToolDefinition};
use crate::config::AzureSettings;
use crate::error::{HealthBotError, Result};
use crate::openai::create_client;
use async_openai::config::AzureConfig;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionTool, ChatCompletionToolType, CreateChatCompletionRequest,
    CreateChatCompletionRequestArgs, FunctionCall, FunctionObject, ResponseFormat,
    ResponseFormatJsonSchema,
};
use async_openai::Client;
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Chat model backed by an Azure OpenAI deployment.
pub struct AzureChatModel {
    client: Client<AzureConfig>,
    deployment: String,
    temperature: f32,
}

impl AzureChatModel {
    /// Create a model from settings and the `AZURE_OPENAI_*` environment.
    pub fn from_settings(settings: &AzureSettings) -> Result<Self> {
        Ok(Self {
            client: create_client(settings)?,
            deployment: settings.resolved_deployment()?,
            temperature: settings.temperature,
        })
    }

    fn request(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
        response_format: Option<ResponseFormat>,
    ) -> Result<CreateChatCompletionRequest> {
        let messages = messages
            .iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>>>()?;

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.deployment)
            .messages(messages)
            .temperature(self.temperature);

        // An empty tools array is rejected by the API.
        if !tools.is_empty() {
            args.tools(tools.iter().map(to_tool).collect::<Vec<_>>());
        }
        if let Some(format) = response_format {
            args.response_format(format);
        }

        args.build()
            .map_err(|e| HealthBotError::OpenAI(format!("Failed to build request: {}", e)))
    }

    async fn send(&self, request: CreateChatCompletionRequest) -> Result<ModelReply> {
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| HealthBotError::OpenAI(format!("Chat API error: {}", e)))?;

        let message = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| HealthBotError::OpenAI("No response from model".to_string()))?
            .message;

        Ok(ModelReply {
            content: message.content,
            tool_calls: message
                .tool_calls
                .unwrap_or_default()
                .into_iter()
                .map(|call| ToolCallRequest {
                    id: call.id,
                    name: call.function.name,
                    arguments: call.function.arguments,
                })
                .collect(),
        })
    }
}

#[async_trait]
impl ChatModel for AzureChatModel {
    #[instrument(skip_all, fields(messages = messages.len(), tools = tools.len()))]
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<ModelReply> {
        let request = self.request(messages, tools, None)?;
        let reply = self.send(request).await?;
        debug!(
            "Model replied with {} tool call(s)",
            reply.tool_calls.len()
        );
        Ok(reply)
    }

    #[instrument(skip_all, fields(schema = %schema.name))]
    async fn complete_structured(
        &self,
        messages: &[ChatMessage],
        schema: &OutputSchema,
    ) -> Result<serde_json::Value> {
        let format = ResponseFormat::JsonSchema {
            json_schema: ResponseFormatJsonSchema {
                description: schema.description.clone(),
                name: schema.name.clone(),
                schema: Some(schema.schema.clone()),
                strict: None,
            },
        };
        let request = self.request(messages, &[], Some(format))?;
        let reply = self.send(request).await?;

        let content = reply
            .content
            .ok_or_else(|| HealthBotError::OpenAI("Empty structured response".to_string()))?;
        Ok(serde_json::from_str(&content)?)
    }

    fn name(&self) -> &str {
        &self.deployment
    }
}

fn to_request_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage> {
    let built: ChatCompletionRequestMessage = match message {
        ChatMessage::System { content } => ChatCompletionRequestSystemMessageArgs::default()
            .content(content.clone())
            .build()
            .map_err(build_error)?
            .into(),
        ChatMessage::User { content } => ChatCompletionRequestUserMessageArgs::default()
            .content(content.clone())
            .build()
            .map_err(build_error)?
            .into(),
        ChatMessage::Assistant {
            content,
            tool_calls,
        } => {
            let mut args = ChatCompletionRequestAssistantMessageArgs::default();
            if let Some(content) = content {
                args.content(content.clone());
            }
            if !tool_calls.is_empty() {
                args.tool_calls(
                    tool_calls
                        .iter()
                        .map(|call| ChatCompletionMessageToolCall {
                            id: call.id.clone(),
                            r#type: ChatCompletionToolType::Function,
                            function: FunctionCall {
                                name: call.name.clone(),
                                arguments: call.arguments.clone(),
                            },
                        })
                        .collect::<Vec<_>>(),
                );
            }
            args.build().map_err(build_error)?.into()
        }
        ChatMessage::Tool {
            tool_call_id,
            content,
            ..
        } => ChatCompletionRequestToolMessageArgs::default()
            .tool_call_id(tool_call_id.clone())
            .content(content.clone())
            .build()
            .map_err(build_error)?
            .into(),
    };
    Ok(built)
}

fn to_tool(tool: &ToolDefinition) -> ChatCompletionTool {
    ChatCompletionTool {
        r#type: ChatCompletionToolType::Function,
        function: FunctionObject {
            name: tool.name.clone(),
            description: Some(tool.description.clone()),
            parameters: Some(tool.parameters.clone()),
            strict: None,
        },
    }
}

fn build_error(e: async_openai::error::OpenAIError) -> HealthBotError {
    HealthBotError::OpenAI(format!("Failed to build message: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_conversion() {
        let tool = ToolDefinition {
            name: "lookup".to_string(),
            description: "Look something up".to_string(),
            parameters: serde_json::json!({"type": "object", "properties": {}}),
        };
        let converted = to_tool(&tool);
        assert_eq!(converted.function.name, "lookup");
        assert_eq!(
            converted.function.description.as_deref(),
            Some("Look something up")
        );
    }

    #[test]
    fn test_assistant_tool_call_message_converts() {
        let message = ChatMessage::Assistant {
            content: None,
            tool_calls: vec![ToolCallRequest {
                id: "call_1".to_string(),
                name: "lookup".to_string(),
                arguments: "{}".to_string(),
            }],
        };
        let converted = to_request_message(&message).unwrap();
        assert!(matches!(
            converted,
            ChatCompletionRequestMessage::Assistant(_)
        ));
    }
}
