//! A single dialogue turn.

use serde::{Deserialize, Serialize};

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The student.
    User,
    /// The troubleshooting assistant (replies, error notices, escalation offers).
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in the transcript. Fields are private so a turn cannot be
/// changed after it has been appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    role: Role,
    text: String,
    /// Set on the assistant turn that offers complaint submission.
    escalation_offered: bool,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            escalation_offered: false,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            escalation_offered: false,
        }
    }

    /// Assistant turn offering to turn the conversation into a complaint.
    pub fn escalation_offer(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            escalation_offered: true,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn escalation_offered(&self) -> bool {
        self.escalation_offered
    }

    /// Render as `"<role>: <text>"`, the form the advice service expects.
    pub fn to_history_string(&self) -> String {
        format!("{}: {}", self.role, self.text)
    }
}
