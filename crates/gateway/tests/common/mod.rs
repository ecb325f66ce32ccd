//! Scripted stand-ins for the model and the search tool, plus an
//! `AppState` wired against a temp directory.

// Each integration test binary compiles this module separately and uses
// a different subset of it.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ie_domain::config::Config;
use ie_domain::message::ToolCall;
use ie_domain::Result;
use ie_gateway::runtime::cancel::CancelMap;
use ie_gateway::runtime::session_lock::SessionLockMap;
use ie_gateway::state::AppState;
use ie_providers::{ChatRequest, ChatResponse, LanguageModel};
use ie_search::{SearchResult, SearchTool, ToolGateway};
use ie_sessions::SessionStore;
use parking_lot::Mutex;

/// Plays back a fixed list of responses, one per `chat` call, and panics
/// if invoked more times than the script allows.
pub struct ScriptedModel {
    script: Mutex<VecDeque<ChatResponse>>,
    pub calls: AtomicUsize,
}

impl ScriptedModel {
    pub fn new(responses: Vec<ChatResponse>) -> Self {
        Self {
            script: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl LanguageModel for ScriptedModel {
    async fn chat(&self, _req: ChatRequest) -> Result<ChatResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .script
            .lock()
            .pop_front()
            .expect("scripted model invoked past the end of its script"))
    }

    fn provider_id(&self) -> &str {
        "scripted"
    }
}

/// Always requests another search, so the turn never reaches an answer.
pub struct RelentlessModel {
    pub calls: AtomicUsize,
}

impl RelentlessModel {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl LanguageModel for RelentlessModel {
    async fn chat(&self, _req: ChatRequest) -> Result<ChatResponse> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(tool_call_response(&format!("call_{n}"), "again"))
    }

    fn provider_id(&self) -> &str {
        "relentless"
    }
}

pub struct FixedSearch;

#[async_trait::async_trait]
impl SearchTool for FixedSearch {
    async fn search(&self, query: &str, _max_results: usize) -> Result<Vec<SearchResult>> {
        Ok(vec![SearchResult {
            title: format!("Result for {query}"),
            url: "https://example.com".into(),
            snippet: "snippet".into(),
        }])
    }
}

pub fn answer_response(text: &str) -> ChatResponse {
    ChatResponse {
        content: text.into(),
        tool_calls: Vec::new(),
        model: "scripted".into(),
        finish_reason: Some("stop".into()),
    }
}

pub fn tool_call_response(call_id: &str, query: &str) -> ChatResponse {
    ChatResponse {
        content: String::new(),
        tool_calls: vec![ToolCall {
            call_id: call_id.into(),
            tool_name: "web_search".into(),
            arguments: serde_json::json!({ "query": query }),
        }],
        model: "scripted".into(),
        finish_reason: Some("tool_calls".into()),
    }
}

pub fn test_state(model: Arc<dyn LanguageModel>, state_dir: &std::path::Path) -> AppState {
    test_state_with_rounds(model, state_dir, 10)
}

pub fn test_state_with_rounds(
    model: Arc<dyn LanguageModel>,
    state_dir: &std::path::Path,
    max_rounds: usize,
) -> AppState {
    let mut config = Config::default();
    config.agent.max_rounds = max_rounds;
    config.sessions.state_path = state_dir.to_path_buf();

    let sessions =
        Arc::new(SessionStore::new(state_dir, config.sessions.title_max_chars).unwrap());
    let tools = Arc::new(ToolGateway::new(Arc::new(FixedSearch), 3));

    AppState {
        config: Arc::new(config),
        model,
        tools,
        sessions,
        session_locks: Arc::new(SessionLockMap::new()),
        cancel_map: Arc::new(CancelMap::new()),
    }
}
