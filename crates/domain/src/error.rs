/// Shared error type used across all Insight Engine crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP: {0}")]
    Http(String),

    #[error("model provider {provider}: {message}")]
    Provider { provider: String, message: String },

    #[error("search: {0}")]
    Search(String),

    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("turn exceeded {0} reasoning rounds")]
    RoundLimit(usize),

    #[error("config: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
