//! Plain-text rendering of view snapshots

use chatbot_core::views::ChatState;
use chatbot_core::{Message, MessageRole};
use chrono::Local;

use crate::i18n::I18n;

/// How many messages are reprinted when the transcript scrolls.
pub const TRANSCRIPT_TAIL: usize = 20;

fn role_label(role: MessageRole, i18n: &I18n) -> String {
    match role {
        MessageRole::User => i18n.t("chat.you"),
        MessageRole::Assistant => i18n.t("chat.assistant"),
        MessageRole::System => i18n.t("chat.system"),
    }
}

pub fn message(message: &Message, i18n: &I18n) -> String {
    let time = message.created_at.with_timezone(&Local).format("%H:%M");
    let mut header = format!("[{}] {}", time, role_label(message.role, i18n));
    if message.is_temp() {
        header.push(' ');
        header.push_str(&i18n.t("chat.pending"));
    }

    let mut out = format!("{header}:");
    for line in message.content.lines() {
        out.push_str("\n    ");
        out.push_str(line);
    }
    out
}

/// The newest `limit` messages, oldest first.
pub fn transcript(messages: &[Message], i18n: &I18n, limit: usize) -> String {
    let start = messages.len().saturating_sub(limit);
    messages[start..]
        .iter()
        .map(|m| message(m, i18n))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn conversation_list(state: &ChatState, i18n: &I18n) -> String {
    if state.conversations.is_empty() {
        return i18n.t("chat.no_conversations");
    }
    let mut out = i18n.t("chat.conversations");
    for (index, conversation) in state.conversations.iter().enumerate() {
        let marker = if state.current_id() == Some(conversation.id.as_str()) {
            '*'
        } else {
            ' '
        };
        out.push_str(&format!("\n {} {:>2}. {}", marker, index + 1, conversation.title));
    }
    out
}

pub fn error(message: &str, i18n: &I18n) -> String {
    format!("{}: {}", i18n.t("error.prefix"), message)
}
