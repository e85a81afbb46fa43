//! Complaints: composing a draft from the chat and filing it with the
//! classifier.

pub mod composer;
pub mod form;
pub mod gateway;

pub use composer::{compose, ComplaintDraft, Requester, KNOWN_CATEGORIES};
pub use form::{ComplaintForm, ScheduledDismiss};
pub use gateway::{
    ClassificationGateway, ClassificationResult, ComplaintStatus, FiledComplaint, Priority,
};
