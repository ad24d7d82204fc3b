//! In-memory conversation log shared by the dispatcher and the renderer.
use crate::turn::{Sender, Turn, TurnIdGenerator};
use tracing::debug;

/// Callback invoked with every turn appended to the conversation.
pub type TurnObserver = Box<dyn Fn(&Turn) + Send + Sync>;

/// State of one conversation for as long as the widget is mounted.
///
/// Turns are append-only and kept in insertion order. `pending` is set while a
/// dispatch is in flight and blocks new user turns until it is cleared.
pub struct ConversationState {
    turns: Vec<Turn>,
    pending: bool,
    draft: String,
    ids: TurnIdGenerator,
    observers: Vec<TurnObserver>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self {
            turns: Vec::new(),
            pending: false,
            draft: String::new(),
            ids: TurnIdGenerator::new(),
            observers: Vec::new(),
        }
    }

    /// Register a callback notified after every append.
    pub fn subscribe(&mut self, observer: TurnObserver) {
        self.observers.push(observer);
    }

    /// Commit a user turn with the trimmed `text`.
    ///
    /// Returns `None` without touching the state when the trimmed text is empty or a
    /// dispatch is already pending.
    pub fn append_user_turn(&mut self, text: &str) -> Option<Turn> {
        let text = text.trim();
        if text.is_empty() {
            debug!("Ignoring blank submission");
            return None;
        }
        if self.pending {
            debug!("Ignoring submission while a dispatch is pending");
            return None;
        }

        Some(self.push(Sender::User, text.to_string()))
    }

    /// Commit a bot turn. Always succeeds.
    pub fn append_bot_turn(&mut self, text: &str) -> Turn {
        self.push(Sender::Bot, text.to_string())
    }

    fn push(&mut self, sender: Sender, text: String) -> Turn {
        let turn = Turn::new(self.ids.next_id(), text, sender);
        self.turns.push(turn.clone());
        for observer in &self.observers {
            observer(&turn);
        }
        turn
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn clear_draft(&mut self) {
        self.draft.clear();
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub(crate) fn set_pending(&mut self, pending: bool) {
        self.pending = pending;
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last_turn(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_new_state_is_empty_and_idle() {
        let state = ConversationState::new();
        assert!(state.is_empty());
        assert!(!state.is_pending());
        assert_eq!(state.draft(), "");
    }

    #[test]
    fn test_append_user_turn_trims_text() {
        let mut state = ConversationState::new();
        let turn = state.append_user_turn("  hello there \n").unwrap();

        assert_eq!(turn.text(), "hello there");
        assert_eq!(turn.sender(), Sender::User);
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_append_user_turn_rejects_blank_text() {
        let mut state = ConversationState::new();
        assert!(state.append_user_turn("").is_none());
        assert!(state.append_user_turn("   \t\n").is_none());
        assert!(state.is_empty());
    }

    #[test]
    fn test_append_user_turn_rejects_while_pending() {
        let mut state = ConversationState::new();
        state.set_pending(true);

        assert!(state.append_user_turn("hello").is_none());
        assert!(state.is_empty());
        assert!(state.is_pending());
    }

    #[test]
    fn test_append_bot_turn_succeeds_while_pending() {
        let mut state = ConversationState::new();
        state.set_pending(true);

        let turn = state.append_bot_turn("reply");
        assert_eq!(turn.sender(), Sender::Bot);
        assert_eq!(state.last_turn(), Some(&turn));
    }

    #[test]
    fn test_turns_keep_insertion_order_and_unique_ids() {
        let mut state = ConversationState::new();
        state.append_user_turn("one").unwrap();
        state.append_bot_turn("two");
        state.append_user_turn("three").unwrap();

        let texts: Vec<&str> = state.turns().iter().map(|t| t.text()).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
        assert_ne!(state.turns()[0].id(), state.turns()[1].id());
        assert_ne!(state.turns()[1].id(), state.turns()[2].id());
    }

    #[test]
    fn test_observers_see_every_append() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut state = ConversationState::new();
        let sink = seen.clone();
        state.subscribe(Box::new(move |turn| {
            sink.lock().unwrap().push(turn.text().to_string());
        }));

        state.append_user_turn("hi").unwrap();
        state.append_user_turn(" ");
        state.append_bot_turn("hello");

        assert_eq!(*seen.lock().unwrap(), vec!["hi", "hello"]);
    }

    #[test]
    fn test_draft_set_and_clear() {
        let mut state = ConversationState::new();
        state.set_draft("typing");
        assert_eq!(state.draft(), "typing");
        state.clear_draft();
        assert_eq!(state.draft(), "");
    }
}
