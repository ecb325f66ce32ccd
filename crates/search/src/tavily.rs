//! Tavily REST adapter.
//!
//! Tavily returns AI-ready result snippets, which is why the original
//! service bound it as the research tool. One POST per query.

use serde_json::Value;

use ie_domain::config::SearchConfig;
use ie_domain::error::{Error, Result};

use crate::{SearchResult, SearchTool};

pub struct TavilySearch {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl TavilySearch {
    /// Create an adapter from config, reading the API key from the
    /// environment variable the config names.
    pub fn from_config(cfg: &SearchConfig) -> Result<Self> {
        let api_key = std::env::var(&cfg.api_key_env).map_err(|_| {
            Error::Config(format!(
                "environment variable {} is not set (Tavily API key)",
                cfg.api_key_env
            ))
        })?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(20))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            api_key,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait::async_trait]
impl SearchTool for TavilySearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        let url = format!("{}/search", self.base_url);
        let body = serde_json::json!({
            "api_key": self.api_key,
            "query": query,
            "max_results": max_results,
        });

        tracing::debug!(query, max_results, "tavily search");

        let resp = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        let payload: Value = resp
            .json()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        if !status.is_success() {
            let detail = payload
                .get("detail")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown error");
            return Err(Error::Search(format!("HTTP {status}: {detail}")));
        }

        Ok(parse_results(&payload))
    }
}

fn parse_results(payload: &Value) -> Vec<SearchResult> {
    payload
        .get("results")
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|r| {
                    Some(SearchResult {
                        title: r.get("title")?.as_str()?.to_string(),
                        url: r.get("url")?.as_str()?.to_string(),
                        snippet: r
                            .get("content")
                            .and_then(|v| v.as_str())
                            .unwrap_or("")
                            .to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}
