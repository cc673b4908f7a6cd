//! Per-node, append-only chat transcripts.

use std::collections::HashMap;

use crate::models::Message;

#[derive(Debug, Clone, Default)]
pub struct ConversationLog {
    logs: HashMap<String, Vec<Message>>,
}

impl ConversationLog {
    /// Insertion order is kept as-is, even if `created_at` goes backwards.
    pub fn append(&mut self, node_id: &str, message: Message) {
        self.logs.entry(node_id.to_string()).or_default().push(message);
    }

    pub fn history(&self, node_id: &str) -> &[Message] {
        self.logs.get(node_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn clear(&mut self) {
        self.logs.clear();
    }
}

/// One `speaker: text` line per message, oldest first. Used as the optional
/// context of a related-items request.
pub fn format_context(history: &[Message]) -> String {
    history
        .iter()
        .map(|m| format!("{}: {}", m.speaker.as_str(), m.text))
        .collect::<Vec<_>>()
        .join("\n")
}
