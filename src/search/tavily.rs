//! Tavily search API client.

use super::{SearchHit, SearchTool};
use crate::config::SearchSettings;
use crate::error::{HealthBotError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Tavily web search.
pub struct TavilySearch {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: u32,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

impl TavilySearch {
    /// Create a client against `base_url` with an explicit key.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Create a client from settings and `TAVILY_API_KEY`.
    pub fn from_settings(settings: &SearchSettings) -> Result<Self> {
        url::Url::parse(&settings.base_url).map_err(|e| {
            HealthBotError::Config(format!(
                "Invalid search base_url '{}': {}",
                settings.base_url, e
            ))
        })?;
        Self::new(&settings.base_url, &SearchSettings::api_key()?)
    }
}

#[async_trait]
impl SearchTool for TavilySearch {
    #[instrument(skip(self))]
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<SearchHit>> {
        let response = self
            .http
            .post(format!("{}/search", self.base_url))
            .json(&SearchRequest {
                api_key: &self.api_key,
                query,
                max_results,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HealthBotError::Search(format!(
                "Tavily returned {}: {}",
                status, body
            )));
        }

        let mut hits = response.json::<SearchResponse>().await?.results;
        hits.truncate(max_results as usize);

        debug!("Tavily returned {} results", hits.len());
        Ok(hits)
    }
}
