//! Scripted model and search fakes shared by unit tests.

use crate::agent::SEARCH_TOOL_NAME;
use crate::error::{HealthBotError, Result};
use crate::llm::{ChatMessage, ChatModel, ModelReply, OutputSchema, ToolCallRequest, ToolDefinition};
use crate::search::{SearchHit, SearchTool};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A model reply asking for one search.
pub fn search_call(id: &str, query: &str) -> ModelReply {
    ModelReply {
        content: None,
        tool_calls: vec![ToolCallRequest {
            id: id.to_string(),
            name: SEARCH_TOOL_NAME.to_string(),
            arguments: serde_json::json!({ "query": query }).to_string(),
        }],
    }
}

/// Replays a fixed list of replies and records every request.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<ModelReply>>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<ModelReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, messages: &[ChatMessage], _: &[ToolDefinition]) -> Result<ModelReply> {
        self.requests.lock().unwrap().push(messages.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| HealthBotError::OpenAI("script exhausted".to_string()))
    }

    async fn complete_structured(
        &self,
        messages: &[ChatMessage],
        _: &OutputSchema,
    ) -> Result<serde_json::Value> {
        let reply = self.complete(messages, &[]).await?;
        Ok(serde_json::from_str(&reply.content.unwrap_or_default())?)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Answers each tutoring step by recognising its prompt.
#[derive(Default)]
pub struct TutorModel {
    prompts: Mutex<Vec<String>>,
}

impl TutorModel {
    /// User prompts seen so far, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for TutorModel {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<ModelReply> {
        let prompt = messages
            .iter()
            .find_map(|m| match m {
                ChatMessage::User { content } => Some(content.clone()),
                _ => None,
            })
            .unwrap_or_default();
        self.prompts.lock().unwrap().push(prompt.clone());

        if !tools.is_empty() {
            if messages.iter().any(ChatMessage::is_tool) {
                return Ok(ModelReply::text("Research complete."));
            }
            return Ok(search_call("call_1", &prompt));
        }
        if prompt.contains("popular science summary") {
            return Ok(ModelReply::text("A friendly summary."));
        }
        if prompt.contains("challenging but fair question") {
            return Ok(ModelReply::text("What is the key takeaway?"));
        }
        Ok(ModelReply::text("ok"))
    }

    async fn complete_structured(
        &self,
        messages: &[ChatMessage],
        _: &OutputSchema,
    ) -> Result<serde_json::Value> {
        if let Some(ChatMessage::User { content }) = messages.first() {
            self.prompts.lock().unwrap().push(content.clone());
        }
        Ok(serde_json::json!({ "score": "B", "justification": "Mostly correct." }))
    }

    fn name(&self) -> &str {
        "tutor"
    }
}

/// Search backend returning one fixed hit.
pub struct StaticSearch {
    snippet: String,
    queries: Mutex<Vec<String>>,
}

impl StaticSearch {
    pub fn with_snippet(snippet: &str) -> Self {
        Self {
            snippet: snippet.to_string(),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchTool for StaticSearch {
    async fn search(&self, query: &str, _: u32) -> Result<Vec<SearchHit>> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(vec![SearchHit {
            title: "Result".to_string(),
            url: "https://health.example/article".to_string(),
            content: self.snippet.clone(),
            score: 0.9,
        }])
    }
}
