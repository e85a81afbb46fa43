//! Complaint Form: the form-side session around one draft.
//!
//! Like the conductor, submission is split into `begin_submit` /
//! `finish_submit` so `busy()` is observable while the classifier works;
//! `submit` runs both against a gateway.

use std::time::Duration;

use crate::complaint::composer::{compose, ComplaintDraft, Requester};
use crate::complaint::gateway::{ClassificationGateway, ClassificationResult};
use crate::error::FormError;
use crate::service::ClassificationService;
use crate::transcript::Transcript;

/// Returned after a successful submission: the front end may leave the form
/// once `delay` has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledDismiss {
    pub delay: Duration,
}

#[derive(Debug)]
pub struct ComplaintForm {
    draft: ComplaintDraft,
    based_on_chat: bool,
    submitting: bool,
    last_result: Option<ClassificationResult>,
    dismiss_delay: Duration,
}

impl ComplaintForm {
    /// Direct entry, no chat behind it.
    pub fn blank(requester: &Requester, dismiss_delay: Duration) -> Self {
        Self {
            draft: ComplaintDraft::blank(requester),
            based_on_chat: false,
            submitting: false,
            last_result: None,
            dismiss_delay,
        }
    }

    /// Pre-fill from a chat transcript (escalation accepted or chat skipped).
    pub fn from_transcript(
        transcript: &Transcript,
        requester: &Requester,
        dismiss_delay: Duration,
    ) -> Self {
        Self {
            draft: compose(transcript, &requester.name, &requester.id),
            based_on_chat: transcript.user_texts().next().is_some(),
            submitting: false,
            last_result: None,
            dismiss_delay,
        }
    }

    pub fn draft(&self) -> &ComplaintDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut ComplaintDraft {
        &mut self.draft
    }

    /// Whether the body was composed from at least one chat message.
    pub fn based_on_chat(&self) -> bool {
        self.based_on_chat
    }

    pub fn busy(&self) -> bool {
        self.submitting
    }

    pub fn last_result(&self) -> Option<&ClassificationResult> {
        self.last_result.as_ref()
    }

    /// Mark the form busy and hand out the draft to submit.
    pub fn begin_submit(&mut self) -> Result<ComplaintDraft, FormError> {
        if self.submitting {
            return Err(FormError::Busy);
        }
        self.submitting = true;
        self.last_result = None;
        Ok(self.draft.clone())
    }

    /// Record the outcome. Success clears the body (name and category stay)
    /// and schedules the dismiss; failure keeps the draft for a resubmit.
    pub fn finish_submit(&mut self, result: ClassificationResult) -> Option<ScheduledDismiss> {
        self.submitting = false;
        let dismiss = match &result {
            Ok(_) => {
                self.draft.set_body(String::new());
                Some(ScheduledDismiss {
                    delay: self.dismiss_delay,
                })
            }
            Err(_) => None,
        };
        self.last_result = Some(result);
        dismiss
    }

    pub async fn submit<S: ClassificationService>(
        &mut self,
        gateway: &ClassificationGateway<S>,
    ) -> Result<Option<ScheduledDismiss>, FormError> {
        let draft = self.begin_submit()?;
        let result = gateway.submit(&draft).await;
        Ok(self.finish_submit(result))
    }
}
