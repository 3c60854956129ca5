//! Research agent with tool calling loop.

use super::tools::{parse_tool_call, tool_definitions, ToolContext};
use crate::config::ResearchPrompts;
use crate::error::{HealthBotError, Result};
use crate::llm::{ChatMessage, ChatModel, ToolCallRequest};
use std::sync::Arc;
use tracing::{debug, info};

/// Content that replaces older tool results before each model call.
pub const OMITTED_TOOL_RESULT: &str = "tool result omitted, deleted internally";

/// Agent that answers a query using the web search tool.
pub struct ResearchAgent {
    model: Arc<dyn ChatModel>,
    tools: ToolContext,
    max_iterations: usize,
    system_prompt: String,
}

impl ResearchAgent {
    /// Create a new agent with the given model and tool context.
    pub fn new(model: Arc<dyn ChatModel>, tools: ToolContext) -> Self {
        Self {
            model,
            tools,
            max_iterations: 50,
            system_prompt: ResearchPrompts::default().system,
        }
    }

    /// Set a custom system prompt.
    pub fn with_system_prompt(mut self, prompt: &str) -> Self {
        self.system_prompt = prompt.to_string();
        self
    }

    /// Set maximum iterations for the agent loop.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Run the agent on a query.
    pub async fn run(&self, query: &str) -> Result<ResearchOutcome> {
        let mut messages = vec![ChatMessage::user(query)];
        let mut iterations = 0;
        let mut tool_calls_made = Vec::new();
        let tools = tool_definitions();

        loop {
            iterations += 1;
            if iterations > self.max_iterations {
                return Err(HealthBotError::Agent(format!(
                    "Agent exceeded maximum iterations ({})",
                    self.max_iterations
                )));
            }

            debug!("Agent iteration {}", iterations);

            let mut prompt = vec![ChatMessage::system(self.system_prompt.clone())];
            prompt.extend(shrink_tool_messages(&messages));

            let reply = self.model.complete(&prompt, &tools).await?;
            messages.push(ChatMessage::assistant(&reply));

            if !reply.wants_tools() {
                return Ok(ResearchOutcome {
                    content: reply.content.unwrap_or_default(),
                    tool_calls: tool_calls_made,
                    messages,
                    iterations,
                });
            }

            for call in &reply.tool_calls {
                let record = self.execute_tool_call(call).await;
                messages.push(ChatMessage::tool(call, record.result.clone()));
                tool_calls_made.push(record);
            }
        }
    }

    /// Execute a single tool call and return a record of it.
    async fn execute_tool_call(&self, call: &ToolCallRequest) -> ToolCallRecord {
        info!(
            "Agent calling tool: {} with args: {}",
            call.name, call.arguments
        );

        let result = match parse_tool_call(&call.name, &call.arguments) {
            Ok(tool) => match self.tools.execute(&tool).await {
                Ok(output) => output,
                Err(e) => format!("Tool error: {}", e),
            },
            Err(e) => format!("Failed to parse tool call: {}", e),
        };

        ToolCallRecord {
            id: call.id.clone(),
            name: call.name.clone(),
            arguments: call.arguments.clone(),
            result,
        }
    }
}

/// Replace every tool result except the last message with a placeholder.
fn shrink_tool_messages(messages: &[ChatMessage]) -> Vec<ChatMessage> {
    let Some((last, earlier)) = messages.split_last() else {
        return Vec::new();
    };

    let mut shrunk: Vec<ChatMessage> = earlier
        .iter()
        .map(|m| match m {
            ChatMessage::Tool {
                tool_call_id, name, ..
            } => ChatMessage::Tool {
                tool_call_id: tool_call_id.clone(),
                name: name.clone(),
                content: OMITTED_TOOL_RESULT.to_string(),
            },
            other => other.clone(),
        })
        .collect();
    shrunk.push(last.clone());
    shrunk
}

/// Result of a research run.
#[derive(Debug, Clone)]
pub struct ResearchOutcome {
    /// The model's final answer.
    pub content: String,
    /// Every tool call made, in order.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Full conversation, excluding the system prompt.
    pub messages: Vec<ChatMessage>,
    /// Number of model calls used.
    pub iterations: usize,
}

impl ResearchOutcome {
    /// Content of the most recent tool result, if any tool was called.
    pub fn last_tool_result(&self) -> Option<&str> {
        self.tool_calls.last().map(|r| r.result.as_str())
    }

    /// Tool-call metadata, tool result content and final answer, concatenated.
    pub fn transcript(&self) -> String {
        let mut parts = Vec::new();
        if let Some(record) = self.tool_calls.last() {
            parts.push(format!("ToolCall: {}", record));
            parts.push(format!("ToolMessage: {}", record.result));
        }
        parts.push(self.content.clone());
        parts.join("\n")
    }
}

/// Record of a tool call made by the agent.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    pub id: String,
    /// Name of the tool called.
    pub name: String,
    /// JSON arguments passed to the tool.
    pub arguments: String,
    /// Result returned by the tool.
    pub result: String,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}
