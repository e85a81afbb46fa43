//! Transcript Store: ordered, append-only log of dialogue turns.
//!
//! A transcript always opens with the assistant greeting. After that, turns
//! are only ever appended; nothing is removed or reordered for the lifetime
//! of a chat session. A new session starts from a fresh transcript.

pub mod turn;

pub use turn::{Role, Turn};

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    /// Start a transcript with the assistant greeting as its first turn.
    pub fn new(greeting: impl Into<String>) -> Self {
        Self {
            turns: vec![Turn::assistant(greeting)],
        }
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Never true in practice: the greeting is always present.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// `"<role>: <text>"` for every turn, in transcript order.
    ///
    /// Each call walks the full transcript again, so the result can be
    /// consumed any number of times.
    pub fn to_history_strings(&self) -> impl Iterator<Item = String> + '_ {
        self.turns.iter().map(Turn::to_history_string)
    }

    /// Texts of user-authored turns, in order.
    pub fn user_texts(&self) -> impl Iterator<Item = &str> + '_ {
        self.turns
            .iter()
            .filter(|t| t.role() == Role::User)
            .map(Turn::text)
    }

    /// Whether any assistant turn has offered a complaint.
    pub fn escalation_offered(&self) -> bool {
        self.turns.iter().any(Turn::escalation_offered)
    }
}
