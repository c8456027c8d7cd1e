use crate::constants::limits;
use crate::llm::{Message, Role};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// One saved exchange.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
    pub timestamp: String,
    pub model: String,
}

impl Conversation {
    /// Build a conversation from a completed user/assistant exchange.
    ///
    /// `id` and `timestamp` are provisional; the store assigns both on append.
    pub fn from_exchange(
        user_message: impl Into<String>,
        assistant_message: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self::from_messages(
            vec![
                Message::user(user_message),
                Message::assistant(assistant_message),
            ],
            model,
        )
    }

    pub fn from_messages(messages: Vec<Message>, model: impl Into<String>) -> Self {
        let title = messages
            .iter()
            .find(|m| m.role == Role::User)
            .map(|m| derive_title(&m.content))
            .unwrap_or_default();

        Self {
            id: String::new(),
            title,
            messages,
            timestamp: now_timestamp(),
            model: model.into(),
        }
    }
}

/// Title from the first user message: at most 50 characters, cut back to the
/// last space when that space lies past index 30, with `...` appended when
/// the message was longer than 50 characters.
pub fn derive_title(message: &str) -> String {
    let char_count = message.chars().count();
    if char_count <= limits::TITLE_MAX_CHARS {
        return message.to_string();
    }

    let prefix: Vec<char> = message.chars().take(limits::TITLE_MAX_CHARS).collect();
    let cut = match prefix.iter().rposition(|c| *c == ' ') {
        Some(space) if space > limits::TITLE_MIN_WORD_CUT => space,
        _ => prefix.len(),
    };

    let mut title: String = prefix[..cut].iter().collect();
    title.push_str(limits::TITLE_ELLIPSIS);
    title
}

/// Current instant as RFC 3339 UTC with millisecond precision.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
