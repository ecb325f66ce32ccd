//! Web-search capability and the tool gateway the agent loop talks to.
//!
//! `SearchTool` is the injected capability (a Tavily adapter in
//! production, a scripted stub in tests). `ToolGateway` owns the tool
//! definition exposed to the model and turns model-issued tool calls into
//! tool-result messages.

mod tavily;

pub use tavily::TavilySearch;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use ie_domain::error::Result;
use ie_domain::message::{Message, ToolCall, ToolDefinition};

/// Name of the single tool exposed to the model.
pub const SEARCH_TOOL_NAME: &str = "web_search";

/// One search hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Search capability trait.
#[async_trait::async_trait]
pub trait SearchTool: Send + Sync {
    /// Run a query and return up to `max_results` ordered hits.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tool gateway
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Executes model-issued tool calls against the search capability and
/// wraps each result as a tool-result message keyed to its call id.
pub struct ToolGateway {
    search: Arc<dyn SearchTool>,
    max_results: usize,
}

impl ToolGateway {
    pub fn new(search: Arc<dyn SearchTool>, max_results: usize) -> Self {
        Self {
            search,
            max_results,
        }
    }

    /// The tool definitions bound to every reasoning request.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        vec![ToolDefinition {
            name: SEARCH_TOOL_NAME.into(),
            description: "Search the web for current information. \
                          Returns a ranked list of results with title, URL and snippet."
                .into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query",
                    }
                },
                "required": ["query"],
            }),
        }]
    }

    /// Execute one tool call. Failures become error text in the result
    /// message so the model can react instead of the turn aborting.
    pub async fn dispatch(&self, call: &ToolCall) -> Message {
        let content = match self.execute(call).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(tool = %call.tool_name, error = %e, "tool call failed");
                format!("Error: {e}")
            }
        };
        Message::tool_result(&call.call_id, content)
    }

    /// Execute all calls of one transition concurrently, preserving call
    /// order in the returned messages.
    pub async fn dispatch_all(&self, calls: &[ToolCall]) -> Vec<Message> {
        let futures: Vec<_> = calls.iter().map(|call| self.dispatch(call)).collect();
        futures_util::future::join_all(futures).await
    }

    async fn execute(&self, call: &ToolCall) -> Result<String> {
        if call.tool_name != SEARCH_TOOL_NAME {
            return Ok(format!("Error: unknown tool '{}'", call.tool_name));
        }

        let query = call
            .arguments
            .get("query")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        if query.is_empty() {
            return Ok("Error: missing 'query' argument".into());
        }

        let results = self.search.search(query, self.max_results).await?;
        Ok(format_results(&results))
    }
}

/// Render search hits as a compact text block for the model.
fn format_results(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return "No results found.".into();
    }
    let mut out = String::new();
    for (i, r) in results.iter().enumerate() {
        if i > 0 {
            out.push_str("\n\n");
        }
        out.push_str(&format!("{}. {} ({})\n{}", i + 1, r.title, r.url, r.snippet));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ie_domain::error::Error;

    struct FixedSearch(Vec<SearchResult>);

    #[async_trait::async_trait]
    impl SearchTool for FixedSearch {
        async fn search(&self, _query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
            Ok(self.0.iter().take(max_results).cloned().collect())
        }
    }

    struct FailingSearch;

    #[async_trait::async_trait]
    impl SearchTool for FailingSearch {
        async fn search(&self, _query: &str, _max_results: usize) -> Result<Vec<SearchResult>> {
            Err(Error::Search("upstream timed out".into()))
        }
    }

    fn call(query: &str) -> ToolCall {
        ToolCall {
            call_id: "call_1".into(),
            tool_name: SEARCH_TOOL_NAME.into(),
            arguments: serde_json::json!({ "query": query }),
        }
    }

    #[tokio::test]
    async fn dispatch_wraps_results_keyed_to_call() {
        let gateway = ToolGateway::new(
            Arc::new(FixedSearch(vec![SearchResult {
                title: "Tokyo Weather".into(),
                url: "https://example.com/tokyo".into(),
                snippet: "18°C, cloudy".into(),
            }])),
            3,
        );
        let msg = gateway.dispatch(&call("weather in Tokyo")).await;
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_1"));
        assert!(msg.content.contains("Tokyo Weather"));
        assert!(msg.content.contains("18°C"));
    }

    #[tokio::test]
    async fn dispatch_all_preserves_call_order() {
        let gateway = ToolGateway::new(Arc::new(FixedSearch(Vec::new())), 3);
        let calls = vec![
            ToolCall {
                call_id: "a".into(),
                tool_name: SEARCH_TOOL_NAME.into(),
                arguments: serde_json::json!({ "query": "one" }),
            },
            ToolCall {
                call_id: "b".into(),
                tool_name: SEARCH_TOOL_NAME.into(),
                arguments: serde_json::json!({ "query": "two" }),
            },
        ];
        let msgs = gateway.dispatch_all(&calls).await;
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].tool_call_id.as_deref(), Some("a"));
        assert_eq!(msgs[1].tool_call_id.as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn search_failure_becomes_error_text() {
        let gateway = ToolGateway::new(Arc::new(FailingSearch), 3);
        let msg = gateway.dispatch(&call("anything")).await;
        assert!(msg.content.starts_with("Error:"));
    }

    #[tokio::test]
    async fn unknown_tool_and_missing_query_are_reported() {
        let gateway = ToolGateway::new(Arc::new(FixedSearch(Vec::new())), 3);

        let msg = gateway
            .dispatch(&ToolCall {
                call_id: "c".into(),
                tool_name: "read_file".into(),
                arguments: serde_json::json!({}),
            })
            .await;
        assert!(msg.content.contains("unknown tool"));

        let msg = gateway
            .dispatch(&ToolCall {
                call_id: "c".into(),
                tool_name: SEARCH_TOOL_NAME.into(),
                arguments: serde_json::json!({}),
            })
            .await;
        assert!(msg.content.contains("missing 'query'"));
    }

    #[test]
    fn empty_results_have_a_fallback_line() {
        assert_eq!(format_results(&[]), "No results found.");
    }
}
