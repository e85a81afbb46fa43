//! Error taxonomy for the conversation-to-complaint pipeline.
//!
//! | Kind          | Where caught              | Shown to the user          |
//! |---------------|---------------------------|----------------------------|
//! | Validation    | before any network call   | which field is missing     |
//! | Service       | service answered non-2xx  | service message, verbatim  |
//! | Connectivity  | no/unparsable response    | generic retry message      |
//!
//! None of them is fatal; each leaves transcript and draft intact and the
//! user can repeat the action.

use thiserror::Error;

use crate::service::ServiceFailure;

/// Chat error turn when the advice service answered with an error.
pub const ADVICE_SERVICE_ERROR_TEXT: &str = "Sorry, I encountered an error. Please try again.";

/// Chat error turn when the advice service could not be reached.
pub const ADVICE_CONNECTIVITY_ERROR_TEXT: &str =
    "Sorry, I'm having trouble connecting. Please try again.";

/// Shown when the classifier rejects a complaint without saying why.
pub const COMPLAINT_SERVICE_FALLBACK_TEXT: &str = "The complaint service rejected the request.";

/// Required complaint fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    RequesterName,
    BodyText,
}

impl std::fmt::Display for RequiredField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RequesterName => write!(f, "name"),
            Self::BodyText => write!(f, "complaint text"),
        }
    }
}

/// Why a complaint submission did not produce a tracking id.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ComplaintError {
    #[error("Please fill in all required fields ({0} is empty)")]
    Validation(RequiredField),

    /// Message passed through from the classifier.
    #[error("{0}")]
    Service(String),

    #[error("Could not reach the complaint service. Please try again.")]
    Connectivity,
}

impl ComplaintError {
    /// Map a port failure. Connectivity causes are not carried; callers log
    /// them before converting.
    pub fn from_failure(failure: &ServiceFailure) -> Self {
        match failure {
            ServiceFailure::Rejected { message, .. } => Self::Service(
                message
                    .clone()
                    .unwrap_or_else(|| COMPLAINT_SERVICE_FALLBACK_TEXT.to_string()),
            ),
            ServiceFailure::Unreachable(_) | ServiceFailure::Malformed(_) => Self::Connectivity,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Misuse of the conversation conductor. Never changes the transcript.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("message is empty")]
    EmptyMessage,

    #[error("a reply is still pending")]
    Busy,

    #[error("no request is awaiting a reply")]
    NotAwaiting,
}

/// Misuse of the complaint form.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("a submission is already in flight")]
    Busy,
}
