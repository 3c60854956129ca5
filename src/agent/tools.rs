//! Tool definitions and implementations for the research agent.

use crate::error::{HealthBotError, Result};
use crate::llm::ToolDefinition;
use crate::search::{hits_to_tool_output, SearchTool};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Name the search tool is exposed under.
pub const SEARCH_TOOL_NAME: &str = "tavily_search_results_json";

/// Available tools for the agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum ToolCall {
    /// Search the web.
    Search { query: String },
}

/// Tool execution context.
pub struct ToolContext {
    pub search: Arc<dyn SearchTool>,
    pub max_results: u32,
}

impl ToolContext {
    /// Create a new tool context.
    pub fn new(search: Arc<dyn SearchTool>, max_results: u32) -> Self {
        Self {
            search,
            max_results,
        }
    }

    /// Execute a tool call and return the result as a string.
    pub async fn execute(&self, tool: &ToolCall) -> Result<String> {
        match tool {
            ToolCall::Search { query } => {
                let hits = self.search.search(query, self.max_results).await?;
                Ok(hits_to_tool_output(&hits))
            }
        }
    }
}

/// Get function/tool definitions for the agent.
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![ToolDefinition {
        name: SEARCH_TOOL_NAME.to_string(),
        description: "A search engine optimized for comprehensive, accurate, and trusted results. \
                      Useful for when you need to answer questions about current events or \
                      up-to-date medical guidance. Input should be a search query."
            .to_string(),
        parameters: serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "search query to look up"
                }
            },
            "required": ["query"]
        }),
    }]
}

/// Parse a tool call from the model's response format.
pub fn parse_tool_call(name: &str, arguments: &str) -> Result<ToolCall> {
    let args: serde_json::Value = serde_json::from_str(arguments)
        .map_err(|e| HealthBotError::Agent(format!("Invalid tool arguments: {}", e)))?;

    match name {
        SEARCH_TOOL_NAME => {
            let query = args["query"]
                .as_str()
                .ok_or_else(|| HealthBotError::Agent("Missing 'query' argument".to_string()))?
                .to_string();
            Ok(ToolCall::Search { query })
        }
        _ => Err(HealthBotError::Agent(format!("Unknown tool: {}", name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StaticSearch;

    #[test]
    fn test_parse_search_tool() {
        let tool = parse_tool_call(SEARCH_TOOL_NAME, r#"{"query": "hypertension diet"}"#).unwrap();
        assert_eq!(
            tool,
            ToolCall::Search {
                query: "hypertension diet".to_string()
            }
        );
    }

    #[test]
    fn test_parse_rejects_unknown_tool_and_bad_args() {
        assert!(parse_tool_call("get_weather", "{}").is_err());
        assert!(parse_tool_call(SEARCH_TOOL_NAME, "{}").is_err());
        assert!(parse_tool_call(SEARCH_TOOL_NAME, "not json").is_err());
    }

    #[test]
    fn test_definitions_expose_single_search_tool() {
        let defs = tool_definitions();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name, SEARCH_TOOL_NAME);
        assert_eq!(defs[0].parameters["required"][0], "query");
    }

    #[tokio::test]
    async fn test_execute_search_formats_hits() {
        let search = Arc::new(StaticSearch::with_snippet("Sleep 7-9 hours."));
        let context = ToolContext::new(search.clone(), 2);

        let output = context
            .execute(&ToolCall::Search {
                query: "sleep".to_string(),
            })
            .await
            .unwrap();

        assert!(output.contains("Sleep 7-9 hours."));
        assert_eq!(search.queries(), vec!["sleep".to_string()]);
    }
}
