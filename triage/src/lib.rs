//! Student Support Triage
//!
//! The conversation-to-complaint pipeline behind the student support portal:
//! - a turn-taking chat with the troubleshooting assistant
//! - detection of replies that should lead to a formal complaint
//! - composing a complaint from the chat and filing it with the classifier
//!
//! # Flow
//!
//! ```text
//! user input → Conductor → Transcript → EscalationDetector
//!                                            │ (offer accepted)
//!                                            ▼
//!                     ComplaintForm ← compose(transcript)
//!                           │
//!                           ▼
//!                 ClassificationGateway → FiledComplaint | ComplaintError
//! ```
//!
//! Both remote services sit behind the [`AdviceService`] and
//! [`ClassificationService`] traits; [`HttpAdviceClient`] and
//! [`HttpClassificationClient`] talk to the real endpoints.

#![allow(clippy::uninlined_format_args)]

pub mod complaint;
pub mod conductor;
pub mod config;
pub mod error;
pub mod escalation;
pub mod service;
pub mod transcript;

// Re-export chat types
pub use conductor::{Conductor, ConductorState, EscalationHook, ScheduledOffer, TransitionRecord};
pub use transcript::{Role, Transcript, Turn};

// Re-export escalation types
pub use escalation::{should_offer, EscalationDetector, Trigger, TriggerSet};

// Re-export complaint types
pub use complaint::{
    compose, ClassificationGateway, ClassificationResult, ComplaintDraft, ComplaintForm,
    ComplaintStatus, FiledComplaint, Priority, Requester, ScheduledDismiss, KNOWN_CATEGORIES,
};

// Re-export service ports and clients
pub use service::{
    AdviceReply, AdviceRequest, AdviceService, ClassificationRequest, ClassificationResponse,
    ClassificationService, ComplaintId, HttpAdviceClient, HttpClassificationClient,
    ServiceFailure,
};

// Re-export config and error types
pub use config::{ConfigError, PortalConfig, PresentationConfig, ServiceConfig};
pub use error::{ComplaintError, FormError, RequiredField, SubmitError};
