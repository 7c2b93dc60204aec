//! Per-run analysis state

use super::result::AnalysisState;
use crate::credentials::Credentials;
use agent_llm::Message;
use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

/// Ordered, append-only record of model-visible messages for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationState {
    messages: Vec<Message>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.messages.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTransition {
    pub from: AnalysisState,
    pub to: AnalysisState,
    pub at: DateTime<Utc>,
}

/// Everything one analysis run reads and mutates
///
/// Built fresh for each run. The engine itself holds no per-run state, so
/// one engine can serve any number of sessions in turn.
#[derive(Debug, Clone)]
pub struct AnalysisSession {
    pub run_id: Uuid,
    pub symbol: String,
    pub credentials: Credentials,
    conversation: ConversationState,
    state: AnalysisState,
    transitions: Vec<StateTransition>,
}

impl AnalysisSession {
    pub fn new(symbol: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            symbol: symbol.into(),
            credentials,
            conversation: ConversationState::new(),
            state: AnalysisState::Idle,
            transitions: Vec::new(),
        }
    }

    pub fn conversation(&self) -> &ConversationState {
        &self.conversation
    }

    pub(crate) fn conversation_mut(&mut self) -> &mut ConversationState {
        &mut self.conversation
    }

    pub fn state(&self) -> AnalysisState {
        self.state
    }

    pub fn transitions(&self) -> &[StateTransition] {
        &self.transitions
    }

    pub(crate) fn transition(&mut self, to: AnalysisState) {
        let from = self.state;
        debug!(run_id = %self.run_id, %from, %to, "State transition");
        self.transitions.push(StateTransition {
            from,
            to,
            at: Utc::now(),
        });
        self.state = to;
    }

    /// Start over: empty conversation and history, back to `Idle`
    pub(crate) fn reset(&mut self) {
        self.conversation.clear();
        self.transitions.clear();
        self.state = AnalysisState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_is_append_only() {
        let mut conversation = ConversationState::new();
        assert!(conversation.is_empty());

        conversation.push(Message::assistant("first"));
        conversation.push(Message::user("second"));

        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation.messages()[0].content, "first");
        assert_eq!(conversation.messages()[1].content, "second");
    }

    #[test]
    fn test_session_transitions_and_reset() {
        let mut session = AnalysisSession::new("ACME", Credentials::default());
        assert_eq!(session.state(), AnalysisState::Idle);

        session.transition(AnalysisState::Price);
        session.conversation_mut().push(Message::user("x"));
        assert_eq!(session.state(), AnalysisState::Price);
        assert_eq!(session.transitions().len(), 1);
        assert_eq!(session.transitions()[0].from, AnalysisState::Idle);

        session.reset();
        assert_eq!(session.state(), AnalysisState::Idle);
        assert!(session.conversation().is_empty());
        assert!(session.transitions().is_empty());
    }

    #[test]
    fn test_sessions_get_distinct_ids() {
        let a = AnalysisSession::new("ACME", Credentials::default());
        let b = AnalysisSession::new("ACME", Credentials::default());
        assert_ne!(a.run_id, b.run_id);
    }
}
