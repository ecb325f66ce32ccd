//! Append-only JSONL message logs.
//!
//! Each session gets a `<sessionId>.jsonl` file under the state directory.
//! Every persisted turn message is one JSON line; file order is creation
//! order, which gives the total per-session ordering for free.
//!
//! Includes an in-memory write-through cache so history reads do not hit
//! disk after the first load, and `spawn_blocking` wrappers so file I/O
//! never blocks the tokio runtime.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use ie_domain::error::{Error, Result};

/// Author of a persisted message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    Human,
    Ai,
}

/// A single persisted message. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    pub role: ChatRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl StoredMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Writes append-only JSONL message logs with a write-through cache.
pub(crate) struct MessageLog {
    base_dir: PathBuf,
    cache: RwLock<HashMap<String, Vec<StoredMessage>>>,
}

impl MessageLog {
    pub fn new(base_dir: &Path) -> Self {
        Self {
            base_dir: base_dir.to_path_buf(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Append messages to a session's log as one write.
    ///
    /// Writes to disk first; the cache is only updated when I/O succeeds.
    pub async fn append(&self, session_id: &str, messages: &[StoredMessage]) -> Result<()> {
        if messages.is_empty() {
            return Ok(());
        }

        let buf = serialize_lines(messages)?;
        let path = self.file_path(session_id);

        tokio::task::spawn_blocking(move || {
            use std::io::Write;
            let mut file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(Error::Io)?;
            file.write_all(buf.as_bytes()).map_err(Error::Io)?;
            Ok::<(), Error>(())
        })
        .await
        .map_err(|e| Error::Other(format!("spawn_blocking join: {e}")))??;

        {
            let mut cache = self.cache.write();
            cache
                .entry(session_id.to_owned())
                .or_default()
                .extend(messages.iter().cloned());
        }

        tracing::debug!(session_id, count = messages.len(), "messages appended");
        Ok(())
    }

    /// Read a session's messages in creation order. Returns cached lines
    /// if available, otherwise loads from disk and populates the cache.
    /// A session with no log yet reads as empty.
    pub async fn read(&self, session_id: &str) -> Result<Vec<StoredMessage>> {
        {
            let cache = self.cache.read();
            if let Some(messages) = cache.get(session_id) {
                return Ok(messages.clone());
            }
        }

        let path = self.file_path(session_id);
        let sid = session_id.to_owned();
        let messages = tokio::task::spawn_blocking(move || read_jsonl_file(&path, &sid))
            .await
            .map_err(|e| Error::Other(format!("spawn_blocking join: {e}")))??;

        {
            let mut cache = self.cache.write();
            cache.insert(session_id.to_owned(), messages.clone());
        }
        Ok(messages)
    }

    /// Remove a session's log file and cache entry (delete cascade).
    pub fn remove(&self, session_id: &str) -> Result<()> {
        self.cache.write().remove(session_id);
        let path = self.file_path(session_id);
        if path.exists() {
            std::fs::remove_file(&path).map_err(Error::Io)?;
        }
        Ok(())
    }

    fn file_path(&self, session_id: &str) -> PathBuf {
        self.base_dir.join(format!("{session_id}.jsonl"))
    }
}

fn serialize_lines(messages: &[StoredMessage]) -> Result<String> {
    let mut buf = String::new();
    for msg in messages {
        buf.push_str(&serde_json::to_string(msg)?);
        buf.push('\n');
    }
    Ok(buf)
}

fn read_jsonl_file(path: &Path, session_id: &str) -> Result<Vec<StoredMessage>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let raw = std::fs::read_to_string(path).map_err(Error::Io)?;
    let mut messages = Vec::new();
    for line in raw.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<StoredMessage>(line) {
            Ok(msg) => messages.push(msg),
            Err(e) => {
                tracing::warn!(session_id, error = %e, "skipping malformed message line");
            }
        }
    }
    Ok(messages)
}
