//! Complaint Composer: turn a chat transcript into an editable draft.

use serde::{Deserialize, Serialize};

use crate::error::{ComplaintError, RequiredField};
use crate::transcript::Transcript;

/// Category hints a front end can offer. Any other string is passed through
/// unchanged; no hint lets the classifier decide.
pub const KNOWN_CATEGORIES: &[&str] = &[
    "Mess",
    "WiFi/Network",
    "Technical Issue",
    "Academic/Teacher",
    "Safety/Security",
];

/// The logged-in student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
    pub id: String,
    pub name: String,
}

impl Requester {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A complaint being prepared for classification.
///
/// The body starts as a snapshot of the chat; edits to the draft and later
/// turns in the chat do not affect each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintDraft {
    requester_id: String,
    requester_name: String,
    category: Option<String>,
    body_text: String,
}

impl ComplaintDraft {
    /// A blank draft for direct entry (no chat).
    pub fn blank(requester: &Requester) -> Self {
        Self {
            requester_id: requester.id.clone(),
            requester_name: requester.name.clone(),
            category: None,
            body_text: String::new(),
        }
    }

    pub fn requester_id(&self) -> &str {
        &self.requester_id
    }

    pub fn requester_name(&self) -> &str {
        &self.requester_name
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn body_text(&self) -> &str {
        &self.body_text
    }

    pub fn set_requester_name(&mut self, name: impl Into<String>) {
        self.requester_name = name.into();
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body_text = body.into();
    }

    /// A blank hint clears the category.
    pub fn set_category(&mut self, category: impl Into<String>) {
        let category = category.into();
        self.category = if category.trim().is_empty() {
            None
        } else {
            Some(category)
        };
    }

    pub fn clear_category(&mut self) {
        self.category = None;
    }

    /// Name and body must be non-blank before anything is sent.
    pub fn validate(&self) -> Result<(), ComplaintError> {
        if self.requester_name.trim().is_empty() {
            return Err(ComplaintError::Validation(RequiredField::RequesterName));
        }
        if self.body_text.trim().is_empty() {
            return Err(ComplaintError::Validation(RequiredField::BodyText));
        }
        Ok(())
    }
}

/// Build a draft from the user turns of `transcript`, joined by single
/// spaces. The category is left for the classifier.
pub fn compose(
    transcript: &Transcript,
    requester_name: &str,
    requester_id: &str,
) -> ComplaintDraft {
    let body_text = transcript.user_texts().collect::<Vec<_>>().join(" ");
    ComplaintDraft {
        requester_id: requester_id.to_string(),
        requester_name: requester_name.to_string(),
        category: None,
        body_text,
    }
}
