use serde::{Deserialize, Serialize};

/// Fixed notice streamed to the caller while the agent searches.
pub const TOOL_NOTICE: &str = "Searching the web...";

/// Events emitted to the caller during a single agent turn.
///
/// This is the full wire vocabulary: one `tool` notice per tool-invoking
/// transition and one `text` event per assistant answer. The stream has no
/// terminator event — end-of-stream is the transport-level signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TurnEvent {
    /// The agent is invoking the search tool.
    Tool { content: String },

    /// An assistant answer (whole-message increment).
    Text { content: String },
}

impl TurnEvent {
    pub fn tool_notice() -> Self {
        Self::Tool {
            content: TOOL_NOTICE.to_owned(),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }
}
