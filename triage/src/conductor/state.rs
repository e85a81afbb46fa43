//! Conductor state: the two chat states and which moves between them are legal.
//!
//! The conductor has exactly two states. Every transition is validated
//! against the edge table and recorded so a test (or a log reader) can
//! reconstruct the exact sequence of states for a chat session.

use std::fmt;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConductorState {
    /// No advice request in flight; input is accepted.
    Idle,
    /// A user turn was appended and its advice request is outstanding.
    AwaitingReply,
}

impl fmt::Display for ConductorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::AwaitingReply => write!(f, "AwaitingReply"),
        }
    }
}

/// ```text
/// Idle → AwaitingReply      (user turn submitted)
/// AwaitingReply → Idle      (reply or error turn appended)
/// ```
fn is_legal_transition(from: ConductorState, to: ConductorState) -> bool {
    use ConductorState::*;
    matches!((from, to), (Idle, AwaitingReply) | (AwaitingReply, Idle))
}

/// One entry in the conductor's transition log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// State before the move.
    pub from: ConductorState,
    /// State after the move.
    pub to: ConductorState,
    /// Wall-clock time of the move.
    pub at: DateTime<Utc>,
    /// Milliseconds since the state machine was created.
    pub elapsed_ms: u64,
    /// What triggered the move, e.g. `"user turn submitted"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Returned when a move is not in the edge table. State is left unchanged.
#[derive(Debug, Clone)]
pub struct IllegalTransition {
    pub from: ConductorState,
    pub to: ConductorState,
}

impl fmt::Display for IllegalTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Illegal conductor transition: {} → {}", self.from, self.to)
    }
}

impl std::error::Error for IllegalTransition {}

pub struct StateMachine {
    current: ConductorState,
    created_at: Instant,
    transitions: Vec<TransitionRecord>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            current: ConductorState::Idle,
            created_at: Instant::now(),
            transitions: Vec::new(),
        }
    }

    pub fn current(&self) -> ConductorState {
        self.current
    }

    pub fn advance(
        &mut self,
        to: ConductorState,
        reason: Option<&str>,
    ) -> Result<(), IllegalTransition> {
        if !is_legal_transition(self.current, to) {
            return Err(IllegalTransition {
                from: self.current,
                to,
            });
        }

        tracing::debug!(
            from = %self.current,
            to = %to,
            reason = reason.unwrap_or(""),
            "Conductor transition"
        );

        self.transitions.push(TransitionRecord {
            from: self.current,
            to,
            at: Utc::now(),
            elapsed_ms: self.created_at.elapsed().as_millis() as u64,
            reason: reason.map(String::from),
        });
        self.current = to;
        Ok(())
    }

    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}
