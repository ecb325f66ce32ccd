//! Context assembly: turn stored history plus the new user message into
//! the message sequence the model sees.

use ie_domain::message::Message;
use ie_sessions::{ChatRole, StoredMessage};

/// Build the model context for a turn.
///
/// History is included newest-first under a character budget: walking back
/// from the most recent stored message, each one is kept whole while the
/// running total stays within `max_history_chars`, and everything older is
/// dropped. The new user message is always appended last, regardless of
/// budget.
pub fn build_context(
    history: &[StoredMessage],
    user_message: &str,
    max_history_chars: usize,
) -> Vec<Message> {
    let mut start = history.len();
    let mut used = 0usize;
    for (i, stored) in history.iter().enumerate().rev() {
        let len = stored.content.chars().count();
        if used + len > max_history_chars {
            break;
        }
        used += len;
        start = i;
    }

    let mut context: Vec<Message> = history[start..].iter().map(to_loop_message).collect();
    context.push(Message::user(user_message));
    context
}

fn to_loop_message(stored: &StoredMessage) -> Message {
    match stored.role {
        ChatRole::Human => Message::user(&stored.content),
        ChatRole::Ai => Message::assistant(&stored.content),
    }
}
