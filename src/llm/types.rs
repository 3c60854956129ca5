//! Provider-neutral chat message types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One message in a chat-completion conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum ChatMessage {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        content: Option<String>,
        #[serde(default)]
        tool_calls: Vec<ToolCallRequest>,
    },
    Tool {
        tool_call_id: String,
        name: String,
        content: String,
    },
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage::System {
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage::User {
            content: content.into(),
        }
    }

    /// Assistant message as returned by the model.
    pub fn assistant(reply: &ModelReply) -> Self {
        ChatMessage::Assistant {
            content: reply.content.clone(),
            tool_calls: reply.tool_calls.clone(),
        }
    }

    pub fn tool(call: &ToolCallRequest, content: impl Into<String>) -> Self {
        ChatMessage::Tool {
            tool_call_id: call.id.clone(),
            name: call.name.clone(),
            content: content.into(),
        }
    }

    pub fn is_tool(&self) -> bool {
        matches!(self, ChatMessage::Tool { .. })
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    /// Raw JSON arguments.
    pub arguments: String,
}

/// A function tool the model may call.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema of the arguments object.
    pub parameters: serde_json::Value,
}

/// The model's answer to one completion request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelReply {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCallRequest>,
}

impl ModelReply {
    /// Plain text reply.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    pub fn wants_tools(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// JSON schema the model's output must conform to.
#[derive(Debug, Clone)]
pub struct OutputSchema {
    pub name: String,
    pub description: Option<String>,
    pub schema: serde_json::Value,
}

impl OutputSchema {
    /// Derive the schema from a `JsonSchema` type.
    pub fn of<T: JsonSchema>(name: &str) -> Self {
        let root = schemars::schema_for!(T);
        let description = root
            .schema
            .metadata
            .as_ref()
            .and_then(|m| m.description.clone());
        let mut schema = serde_json::to_value(&root).unwrap_or_default();
        if let serde_json::Value::Object(map) = &mut schema {
            map.remove("$schema");
            map.remove("title");
        }
        Self {
            name: name.to_string(),
            description,
            schema,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A scored answer.
    #[derive(Deserialize, JsonSchema)]
    #[allow(dead_code)]
    struct Scored {
        /// The score.
        score: String,
    }

    #[test]
    fn test_output_schema_from_type() {
        let schema = OutputSchema::of::<Scored>("scored");
        assert_eq!(schema.name, "scored");
        assert_eq!(schema.description.as_deref(), Some("A scored answer."));
        assert!(schema.schema.get("$schema").is_none());
        assert_eq!(schema.schema["properties"]["score"]["type"], "string");
        assert_eq!(schema.schema["required"][0], "score");
    }

    #[test]
    fn test_message_serializes_with_role_tag() {
        let msg = ChatMessage::user("hello");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["content"], "hello");
    }
}
