/// Marker appended to truncated titles.
const ELLIPSIS: char = '…';

/// Derive a session title from the first user message.
///
/// Truncates to at most `max_chars` characters at a word boundary and
/// appends an ellipsis marker when anything was cut. Never splits a word,
/// except for a single word that is itself longer than the budget.
pub fn derive_title(text: &str, max_chars: usize) -> String {
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.chars().count() <= max_chars {
        return text;
    }

    let mut kept = String::new();
    for word in text.split(' ') {
        let candidate_len = if kept.is_empty() {
            word.chars().count()
        } else {
            kept.chars().count() + 1 + word.chars().count()
        };
        if candidate_len > max_chars {
            break;
        }
        if !kept.is_empty() {
            kept.push(' ');
        }
        kept.push_str(word);
    }

    // Single word longer than the budget: hard-cut it.
    if kept.is_empty() {
        kept = text.chars().take(max_chars).collect();
    }

    kept.push(ELLIPSIS);
    kept
}
