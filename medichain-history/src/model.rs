use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Speaker of a stored message. Rows keep the legacy `sender` column values
/// `user` and `bot`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_sender(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "bot",
        }
    }

    /// Anything other than `user` was written by the assistant.
    pub fn from_sender(sender: &str) -> Self {
        if sender == "user" {
            MessageRole::User
        } else {
            MessageRole::Assistant
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub last_active: Option<DateTime<Utc>>,
    pub preview: String,
}

pub(crate) const NO_TITLE: &str = "No Title";
const TITLE_CHARS: usize = 50;

/// Conversation title taken from the opening user message.
pub(crate) fn title_from(content: &str) -> String {
    content.trim().chars().take(TITLE_CHARS).collect()
}

pub(crate) fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|at| at.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sender_column_round_trips_roles() {
        assert_eq!(MessageRole::User.as_sender(), "user");
        assert_eq!(MessageRole::Assistant.as_sender(), "bot");
        assert_eq!(MessageRole::from_sender("bot"), MessageRole::Assistant);
        assert_eq!(MessageRole::from_sender("assistant"), MessageRole::Assistant);
        assert_eq!(MessageRole::from_sender("user"), MessageRole::User);
    }

    #[test]
    fn stored_timestamps_sort_lexically() {
        let earlier = parse_timestamp("2026-02-06T00:00:00.000001Z").unwrap();
        let later = parse_timestamp("2026-02-06T00:00:00.000010Z").unwrap();
        assert!(format_timestamp(earlier) < format_timestamp(later));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn title_is_clipped_to_fifty_chars() {
        let title = title_from(&"đau ".repeat(30));
        assert_eq!(title.chars().count(), 50);
        assert_eq!(title_from("  ho khan  "), "ho khan");
    }
}
