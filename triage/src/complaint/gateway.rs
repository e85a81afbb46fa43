//! Classification Gateway: validate a draft, classify it, map the outcome.

use serde::{Deserialize, Serialize};

use crate::complaint::composer::ComplaintDraft;
use crate::error::ComplaintError;
use crate::service::{
    ClassificationRequest, ClassificationResponse, ClassificationService, ComplaintId,
};

/// Priority label assigned by the classifier (its `sentiment`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Priority(String);

impl Priority {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// The label as the service sent it.
    pub fn label(&self) -> &str {
        &self.0
    }
}

/// Displays uppercased, e.g. `HIGH`.
impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.to_uppercase())
    }
}

/// Lifecycle of a filed complaint as seen by the student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintStatus {
    PendingReview,
}

impl std::fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PendingReview => write!(f, "Pending Review"),
        }
    }
}

/// A complaint the classifier accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiledComplaint {
    pub complaint_id: ComplaintId,
    pub category: String,
    pub priority: Priority,
    /// Always starts as `PendingReview`, whatever the category or priority.
    pub status: ComplaintStatus,
    /// Raw status string from the service, kept for logs.
    pub service_status: Option<String>,
}

impl From<ClassificationResponse> for FiledComplaint {
    fn from(resp: ClassificationResponse) -> Self {
        Self {
            complaint_id: resp.id,
            category: resp.category,
            priority: Priority::new(resp.sentiment),
            status: ComplaintStatus::PendingReview,
            service_status: resp.status,
        }
    }
}

pub type ClassificationResult = Result<FiledComplaint, ComplaintError>;

pub struct ClassificationGateway<S> {
    service: S,
}

impl<S: ClassificationService> ClassificationGateway<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    /// Submit `draft`. Invalid drafts never reach the service. Failures are
    /// terminal; calling again with the same or an edited draft is the retry.
    pub async fn submit(&self, draft: &ComplaintDraft) -> ClassificationResult {
        draft.validate()?;

        let request = ClassificationRequest {
            student_id: draft.requester_id().to_string(),
            student_name: draft.requester_name().to_string(),
            complaint_text: draft.body_text().to_string(),
            complaint_type: draft.category().map(str::to_string),
        };

        tracing::info!(
            student_id = %request.student_id,
            hint = request.complaint_type.as_deref().unwrap_or("none"),
            chars = request.complaint_text.len(),
            "Submitting complaint for classification"
        );

        match self.service.classify(&request).await {
            Ok(resp) => {
                let filed = FiledComplaint::from(resp);
                tracing::info!(
                    complaint_id = %filed.complaint_id,
                    category = %filed.category,
                    priority = %filed.priority,
                    "Complaint filed"
                );
                Ok(filed)
            }
            Err(failure) => {
                tracing::warn!(error = %failure, "Complaint classification failed");
                Err(ComplaintError::from_failure(&failure))
            }
        }
    }
}
