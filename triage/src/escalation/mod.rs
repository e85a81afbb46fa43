//! Escalation: when a chat should turn into a formal complaint
//!
//! ```text
//! assistant reply appended
//!     │
//!     ├─ no trigger matches → nothing
//!     │
//!     ▼
//! trigger matches → ScheduledOffer { delay }
//!     │  front end waits `delay` (or not, in tests)
//!     ▼
//! offer turn appended (escalation_offered = true)
//!     │
//!     ▼
//! user accepts → hooks receive the transcript → Complaint Composer
//! ```

pub mod detector;

pub use detector::{
    should_offer, EscalationDetector, Trigger, TriggerSet, DEFAULT_TRIGGER_PHRASES,
    ESCALATION_OFFER_TEXT,
};
