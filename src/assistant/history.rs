use super::{ChatMessage, Sender};

/// Role names the remote protocol expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryRole {
    User,
    Model,
}

impl HistoryRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryRole::User => "user",
            HistoryRole::Model => "model",
        }
    }
}

impl From<Sender> for HistoryRole {
    fn from(sender: Sender) -> Self {
        match sender {
            Sender::User => HistoryRole::User,
            Sender::Assistant => HistoryRole::Model,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HistoryEntry {
    pub role: HistoryRole,
    pub text: String,
}

impl HistoryEntry {
    pub fn new(role: HistoryRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// Converts a transcript into the remote history shape.
///
/// The first message is dropped only when the assistant wrote it (the greeting).
pub fn format_history(messages: &[ChatMessage]) -> Vec<HistoryEntry> {
    let messages = match messages.first() {
        Some(first) if first.sender == Sender::Assistant => &messages[1..],
        _ => messages,
    };
    messages
        .iter()
        .map(|m| HistoryEntry::new(m.sender.into(), m.text.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn greeting_is_skipped() {
        let transcript = vec![
            ChatMessage::assistant("Hello! I am the AI assistant"),
            ChatMessage::user("hi"),
            ChatMessage::assistant("hello"),
        ];
        assert_eq!(
            format_history(&transcript),
            vec![
                HistoryEntry::new(HistoryRole::User, "hi"),
                HistoryEntry::new(HistoryRole::Model, "hello"),
            ]
        );
    }

    #[test]
    fn leading_user_message_is_kept() {
        let transcript = vec![ChatMessage::user("first"), ChatMessage::assistant("reply")];
        let history = format_history(&transcript);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role.as_str(), "user");
        assert_eq!(history[1].role.as_str(), "model");
    }

    #[test]
    fn only_the_first_assistant_message_is_skipped() {
        let transcript = vec![
            ChatMessage::assistant("greeting"),
            ChatMessage::assistant("second"),
        ];
        assert_eq!(
            format_history(&transcript),
            vec![HistoryEntry::new(HistoryRole::Model, "second")]
        );
        assert!(format_history(&[]).is_empty());
    }
}
