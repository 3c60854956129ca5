//! Web search backends for the research agent.

mod tavily;

pub use tavily::TavilySearch;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single ranked search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    pub url: String,
    /// Snippet or extracted page content.
    pub content: String,
    /// Relevance score reported by the backend (higher is better).
    #[serde(default)]
    pub score: f64,
}

/// Trait for web search implementations.
#[async_trait]
pub trait SearchTool: Send + Sync {
    /// Run a query and return at most `max_results` hits, best first.
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<SearchHit>>;
}

/// Format hits the way the agent tool reports them: a JSON array of
/// `{url, content}` objects.
pub fn hits_to_tool_output(hits: &[SearchHit]) -> String {
    let items: Vec<serde_json::Value> = hits
        .iter()
        .map(|h| serde_json::json!({ "url": h.url, "content": h.content }))
        .collect();
    serde_json::Value::Array(items).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hits_to_tool_output() {
        let hits = vec![SearchHit {
            title: "Diabetes diet".to_string(),
            url: "https://example.org/diet".to_string(),
            content: "Eat fiber.".to_string(),
            score: 0.9,
        }];
        let output = hits_to_tool_output(&hits);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed[0]["url"], "https://example.org/diet");
        assert_eq!(parsed[0]["content"], "Eat fiber.");
        assert!(parsed[0].get("title").is_none());
    }

    #[test]
    fn test_empty_hits_is_empty_array() {
        assert_eq!(hits_to_tool_output(&[]), "[]");
    }
}
