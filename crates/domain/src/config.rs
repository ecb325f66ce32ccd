//! TOML configuration tree.
//!
//! Every section has serde defaults so an empty (or absent) `config.toml`
//! yields a runnable local setup. API keys are never stored in the file —
//! each section names the environment variable that holds its key.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub context: ContextConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub sessions: SessionsConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Server
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "d_port")]
    pub port: u16,
    #[serde(default = "d_host")]
    pub host: String,
    /// Origins allowed for CORS. Defaults to the local dev frontend.
    #[serde(default = "d_cors_origins")]
    pub cors_origins: Vec<String>,
    /// Cap on concurrently served requests.
    #[serde(default = "d_max_concurrent")]
    pub max_concurrent_requests: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: d_port(),
            host: d_host(),
            cors_origins: d_cors_origins(),
            max_concurrent_requests: d_max_concurrent(),
        }
    }
}

fn d_port() -> u16 {
    8000
}
fn d_host() -> String {
    "127.0.0.1".into()
}
fn d_cors_origins() -> Vec<String> {
    vec!["http://localhost:3000".into()]
}
fn d_max_concurrent() -> usize {
    256
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Language model
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Environment variable holding the Groq API key.
    #[serde(default = "d_llm_key_env")]
    pub api_key_env: String,
    #[serde(default = "d_llm_base_url")]
    pub base_url: String,
    #[serde(default = "d_llm_model")]
    pub model: String,
    /// Sampling temperature. Zero keeps tool-call emission precise.
    #[serde(default)]
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key_env: d_llm_key_env(),
            base_url: d_llm_base_url(),
            model: d_llm_model(),
            temperature: 0.0,
        }
    }
}

fn d_llm_key_env() -> String {
    "GROQ_API_KEY".into()
}
fn d_llm_base_url() -> String {
    "https://api.groq.com/openai/v1".into()
}
fn d_llm_model() -> String {
    "llama-3.3-70b-versatile".into()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Search tool
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Environment variable holding the Tavily API key.
    #[serde(default = "d_search_key_env")]
    pub api_key_env: String,
    #[serde(default = "d_search_base_url")]
    pub base_url: String,
    #[serde(default = "d_max_results")]
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key_env: d_search_key_env(),
            base_url: d_search_base_url(),
            max_results: d_max_results(),
        }
    }
}

fn d_search_key_env() -> String {
    "TAVILY_API_KEY".into()
}
fn d_search_base_url() -> String {
    "https://api.tavily.com".into()
}
fn d_max_results() -> usize {
    3
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Context & agent loop
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Character budget for prior history fed to the reasoning step.
    /// Oldest messages are dropped first once exceeded.
    #[serde(default = "d_max_history_chars")]
    pub max_history_chars: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_history_chars: d_max_history_chars(),
        }
    }
}

fn d_max_history_chars() -> usize {
    4000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum reasoning rounds per turn before the loop is force-stopped.
    #[serde(default = "d_max_rounds")]
    pub max_rounds: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_rounds: d_max_rounds(),
        }
    }
}

fn d_max_rounds() -> usize {
    10
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Sessions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// Directory holding `sessions.json` and the per-session message logs.
    #[serde(default = "d_state_path")]
    pub state_path: PathBuf,
    /// Display budget for derived session titles.
    #[serde(default = "d_title_max_chars")]
    pub title_max_chars: usize,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            state_path: d_state_path(),
            title_max_chars: d_title_max_chars(),
        }
    }
}

fn d_state_path() -> PathBuf {
    PathBuf::from("./data")
}
fn d_title_max_chars() -> usize {
    50
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_uses_all_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.server.port, 8000);
        assert_eq!(cfg.llm.model, "llama-3.3-70b-versatile");
        assert_eq!(cfg.llm.temperature, 0.0);
        assert_eq!(cfg.search.max_results, 3);
        assert_eq!(cfg.agent.max_rounds, 10);
        assert_eq!(cfg.context.max_history_chars, 4000);
        assert_eq!(cfg.sessions.title_max_chars, 50);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let toml_str = r#"
            [server]
            port = 9090
            host = "0.0.0.0"

            [agent]
            max_rounds = 4
        "#;
        let cfg: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.agent.max_rounds, 4);
        // Untouched sections fall back to defaults.
        assert_eq!(cfg.llm.api_key_env, "GROQ_API_KEY");
        assert_eq!(cfg.search.api_key_env, "TAVILY_API_KEY");
    }

    #[test]
    fn llm_section_overrides() {
        let toml_str = r#"
            [llm]
            base_url = "http://localhost:11434/v1"
            model = "llama3"
            temperature = 0.2
        "#;
        let cfg: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.llm.base_url, "http://localhost:11434/v1");
        assert_eq!(cfg.llm.model, "llama3");
        assert!((cfg.llm.temperature - 0.2).abs() < f32::EPSILON);
    }
}
