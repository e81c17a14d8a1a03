//! Conversation state: an ordered, append-only turn history.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in the conversation. Immutable once appended.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Ordered turn history for one conversation.
///
/// The store does not enforce strict user/assistant alternation: a failed
/// assistant reply legitimately leaves two consecutive user turns. Nothing
/// removes or reorders past turns except [`ConversationSession::clear`].
#[derive(Debug, Default)]
pub struct ConversationSession {
    turns: Vec<ConversationTurn>,
}

impl ConversationSession {
    pub fn new() -> Self {
        Self { turns: Vec::new() }
    }

    /// Append a user turn.
    pub fn append_user(&mut self, text: impl Into<String>) {
        self.push(Role::User, text.into());
    }

    /// Append an assistant turn.
    pub fn append_assistant(&mut self, text: impl Into<String>) {
        self.push(Role::Assistant, text.into());
    }

    fn push(&mut self, role: Role, text: String) {
        self.turns.push(ConversationTurn {
            role,
            text,
            timestamp: Utc::now(),
        });
    }

    /// A stable snapshot of the history. Callers iterating the snapshot are
    /// unaffected by concurrent appends.
    pub fn history(&self) -> Vec<ConversationTurn> {
        self.turns.clone()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Reset the session to empty, returning how many turns were dropped.
    pub fn clear(&mut self) -> usize {
        let cleared = self.turns.len();
        self.turns.clear();
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_empty() {
        let session = ConversationSession::new();
        assert!(session.is_empty());
        assert_eq!(session.len(), 0);
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_append_pair_in_call_order() {
        let mut session = ConversationSession::new();
        session.append_user("hola");
        session.append_assistant("hola, ¿en qué puedo ayudarte?");

        let history = session.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[0].text, "hola");
        assert_eq!(history[1].role, Role::Assistant);
    }

    #[test]
    fn test_clear_then_history_is_empty() {
        let mut session = ConversationSession::new();
        session.append_user("uno");
        session.append_assistant("dos");
        assert_eq!(session.clear(), 2);
        assert!(session.history().is_empty());

        // A subsequent pair yields a fresh two-element sequence.
        session.append_user("tres");
        session.append_assistant("cuatro");
        let history = session.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].text, "tres");
    }

    #[test]
    fn test_clear_on_empty_session() {
        let mut session = ConversationSession::new();
        assert_eq!(session.clear(), 0);
    }

    #[test]
    fn test_consecutive_user_turns_tolerated() {
        // A failed assistant reply leaves two user turns in a row; this is
        // valid state, not corruption.
        let mut session = ConversationSession::new();
        session.append_user("primera");
        session.append_user("segunda");

        let history = session.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[1].role, Role::User);
    }

    #[test]
    fn test_history_is_a_snapshot() {
        let mut session = ConversationSession::new();
        session.append_user("antes");
        let snapshot = session.history();
        session.append_assistant("después");

        assert_eq!(snapshot.len(), 1);
        assert_eq!(session.len(), 2);
    }

    #[test]
    fn test_turn_timestamps_monotonic_order_preserved() {
        let mut session = ConversationSession::new();
        for i in 0..5 {
            session.append_user(format!("mensaje {}", i));
        }
        let history = session.history();
        for pair in history.windows(2) {
            assert!(pair[0].timestamp <= pair[1].timestamp);
        }
        assert_eq!(history[4].text, "mensaje 4");
    }

    #[test]
    fn test_turn_serialization_shape() {
        let mut session = ConversationSession::new();
        session.append_user("hola");
        let json = serde_json::to_value(session.history()).unwrap();
        assert_eq!(json[0]["role"], "user");
        assert_eq!(json[0]["text"], "hola");
        assert!(json[0]["timestamp"].is_string());
    }
}
