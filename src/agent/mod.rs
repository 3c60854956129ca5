//! Research agent with web search tool calling.
//!
//! The agent binds a single search tool to the chat model and keeps calling
//! the model until it stops requesting tool calls.

mod runner;
mod tools;

pub use runner::{ResearchAgent, ResearchOutcome, ToolCallRecord, OMITTED_TOOL_RESULT};
pub use tools::{parse_tool_call, tool_definitions, ToolCall, ToolContext, SEARCH_TOOL_NAME};
