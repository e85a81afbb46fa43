//! Remote service ports: the advice (chat) endpoint and the complaint
//! classification endpoint.
//!
//! The conductor and the gateway only see these traits. `http` provides the
//! reqwest-backed implementations; tests substitute fakes.

pub mod http;

pub use http::{HttpAdviceClient, HttpClassificationClient};

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reported by a service port.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceFailure {
    /// The service answered with a non-success status.
    #[error("service returned status {status}: {}", .message.as_deref().unwrap_or("<no message>"))]
    Rejected {
        status: u16,
        /// The service's own `error` field, when it sent one.
        message: Option<String>,
    },

    /// No response: connection refused, DNS failure, timeout.
    #[error("service unreachable: {0}")]
    Unreachable(String),

    /// A success status with a body that does not match the contract.
    #[error("malformed service response: {0}")]
    Malformed(String),
}

impl ServiceFailure {
    /// Unreachable and malformed responses are both surfaced to the user as
    /// connectivity problems.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Unreachable(_) | Self::Malformed(_))
    }
}

/// Request body for the advice endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdviceRequest {
    /// The new user message, not yet part of the history.
    pub message: String,
    /// `"<role>: <text>"` lines, in transcript order.
    pub conversation_history: Vec<String>,
}

/// Success body from the advice endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdviceReply {
    /// Assistant text, appended to the transcript verbatim.
    pub reply: String,
}

/// Request body for the classification endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRequest {
    /// Requester id from the login session.
    pub student_id: String,
    /// Name as entered on the form (may differ from the login name).
    pub student_name: String,
    /// Complaint body, usually composed from the chat and then edited.
    pub complaint_text: String,
    /// Category hint; omitted so the classifier decides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complaint_type: Option<String>,
}

/// Tracking identifier issued by the classifier. Deployed services have
/// returned both integer and string ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ComplaintId {
    Number(u64),
    Text(String),
}

impl std::fmt::Display for ComplaintId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Success body from the classification endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResponse {
    /// Tracking id shown to the student as `#<id>`.
    pub id: ComplaintId,
    /// Category the classifier settled on.
    pub category: String,
    /// Used as the priority label.
    pub sentiment: String,
    /// Service-side status string, e.g. `"pending"`.
    #[serde(default)]
    pub status: Option<String>,
}

/// Error body both endpoints send with non-success statuses.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

/// The troubleshooting assistant.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdviceService: Send + Sync {
    async fn advise(&self, request: &AdviceRequest) -> Result<AdviceReply, ServiceFailure>;
}

/// The complaint classifier.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClassificationService: Send + Sync {
    async fn classify(
        &self,
        request: &ClassificationRequest,
    ) -> Result<ClassificationResponse, ServiceFailure>;
}

/// Shared services, e.g. one client behind several gateways.
#[async_trait]
impl<T: AdviceService + ?Sized> AdviceService for Arc<T> {
    async fn advise(&self, request: &AdviceRequest) -> Result<AdviceReply, ServiceFailure> {
        (**self).advise(request).await
    }
}

#[async_trait]
impl<T: ClassificationService + ?Sized> ClassificationService for Arc<T> {
    async fn classify(
        &self,
        request: &ClassificationRequest,
    ) -> Result<ClassificationResponse, ServiceFailure> {
        (**self).classify(request).await
    }
}
