//! Session repository.
//!
//! The session index lives in `sessions.json` under the state directory;
//! message logs live beside it as one JSONL file per session. All access
//! goes through [`SessionStore`], the one repository surface the rest of
//! the system sees.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use ie_domain::error::{Error, Result};

use crate::log::{ChatRole, MessageLog, StoredMessage};
use crate::title::derive_title;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A durable conversation thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    /// Derived from the first user message; renameable afterwards.
    #[serde(default)]
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Reflects the most recent completed turn; list ordering key.
    pub updated_at: DateTime<Utc>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// File-backed session repository with cascade to the message logs.
pub struct SessionStore {
    sessions_path: PathBuf,
    sessions: RwLock<HashMap<String, Session>>,
    log: MessageLog,
    title_max_chars: usize,
}

impl SessionStore {
    /// Load or create the store under `state_path`.
    pub fn new(state_path: &Path, title_max_chars: usize) -> Result<Self> {
        std::fs::create_dir_all(state_path).map_err(Error::Io)?;

        let sessions_path = state_path.join("sessions.json");
        let sessions: HashMap<String, Session> = if sessions_path.exists() {
            let raw = std::fs::read_to_string(&sessions_path).map_err(Error::Io)?;
            serde_json::from_str(&raw).unwrap_or_default()
        } else {
            HashMap::new()
        };

        tracing::info!(
            sessions = sessions.len(),
            path = %sessions_path.display(),
            "session store loaded"
        );

        Ok(Self {
            sessions_path,
            sessions: RwLock::new(sessions),
            log: MessageLog::new(state_path),
            title_max_chars,
        })
    }

    /// Look up a session by id.
    pub fn get(&self, id: &str) -> Option<Session> {
        self.sessions.read().get(id).cloned()
    }

    /// All sessions, most recently updated first.
    pub fn list(&self) -> Vec<Session> {
        let mut sessions: Vec<Session> = self.sessions.read().values().cloned().collect();
        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        sessions
    }

    /// Rename a session. Unknown ids are a not-found outcome and mutate
    /// nothing.
    pub fn rename(&self, id: &str, title: &str) -> Result<Session> {
        let updated = {
            let mut sessions = self.sessions.write();
            let entry = sessions
                .get_mut(id)
                .ok_or_else(|| Error::SessionNotFound(id.to_owned()))?;
            entry.title = Some(title.to_owned());
            entry.updated_at = Utc::now();
            entry.clone()
        };
        self.flush()?;
        Ok(updated)
    }

    /// Delete a session, cascading to its message log.
    pub fn delete(&self, id: &str) -> Result<()> {
        {
            let mut sessions = self.sessions.write();
            if sessions.remove(id).is_none() {
                return Err(Error::SessionNotFound(id.to_owned()));
            }
        }
        self.log.remove(id)?;
        self.flush()?;
        tracing::info!(session_id = id, "session deleted");
        Ok(())
    }

    /// Set a session's `updated_at` to now.
    pub fn touch(&self, id: &str) {
        let mut sessions = self.sessions.write();
        if let Some(entry) = sessions.get_mut(id) {
            entry.updated_at = Utc::now();
        }
    }

    /// Read a session's messages in creation order. A session that exists
    /// but has no messages yet (or an id that was never committed) reads
    /// as empty — callers that need a not-found outcome check [`get`]
    /// first.
    ///
    /// [`get`]: SessionStore::get
    pub async fn list_messages(&self, id: &str) -> Result<Vec<StoredMessage>> {
        self.log.read(id).await
    }

    /// Commit one completed turn as a single unit:
    /// create the session if the id is unknown (title derived from the
    /// user message), append the human message unconditionally, append the
    /// ai message only when `final_text` is non-empty, and advance
    /// `updated_at`. One log write, one index write.
    pub async fn commit_turn(
        &self,
        id: &str,
        user_text: &str,
        final_text: Option<&str>,
    ) -> Result<()> {
        let mut messages = vec![StoredMessage::new(ChatRole::Human, user_text)];
        if let Some(text) = final_text.filter(|t| !t.is_empty()) {
            messages.push(StoredMessage::new(ChatRole::Ai, text));
        }
        self.log.append(id, &messages).await?;

        {
            let now = Utc::now();
            let mut sessions = self.sessions.write();
            sessions
                .entry(id.to_owned())
                .and_modify(|entry| entry.updated_at = now)
                .or_insert_with(|| {
                    let title = (!user_text.trim().is_empty())
                        .then(|| derive_title(user_text, self.title_max_chars));
                    tracing::info!(session_id = id, "new session created");
                    Session {
                        id: id.to_owned(),
                        title,
                        created_at: now,
                        updated_at: now,
                    }
                });
        }
        self.flush()
    }

    /// Persist the session index to disk.
    pub fn flush(&self) -> Result<()> {
        let sessions = self.sessions.read();
        let json = serde_json::to_string_pretty(&*sessions)?;
        std::fs::write(&self.sessions_path, json).map_err(Error::Io)?;
        Ok(())
    }
}
