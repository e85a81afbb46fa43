//! Escalation Detector: decide whether an assistant reply should be
//! followed by an offer to file a formal complaint.
//!
//! Detection is a pure predicate over the reply text. It holds no state and
//! knows nothing about turn-taking, so trigger phrases can be tuned without
//! touching the conductor.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Trigger phrases used when no configuration overrides them.
pub const DEFAULT_TRIGGER_PHRASES: &[&str] = &["formal complaint", "submit a complaint"];

/// Text of the assistant turn appended when a trigger fires.
pub const ESCALATION_OFFER_TEXT: &str =
    "Ready to submit a formal complaint? I can help you create one based on our conversation!";

/// A single escalation trigger.
#[derive(Debug, Clone)]
pub enum Trigger {
    /// Case-insensitive substring match. Stored lowercased.
    Phrase(String),
    /// Case-insensitive regular expression.
    Pattern(Regex),
}

impl Trigger {
    pub fn phrase(phrase: impl AsRef<str>) -> Self {
        Self::Phrase(phrase.as_ref().to_lowercase())
    }

    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map(Self::Pattern)
    }

    /// `lowered` must be the lowercased reply; `raw` the original.
    fn matches(&self, raw: &str, lowered: &str) -> bool {
        match self {
            Self::Phrase(p) => lowered.contains(p.as_str()),
            Self::Pattern(re) => re.is_match(raw),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Phrase(p) => format!("phrase:{}", p),
            Self::Pattern(re) => format!("pattern:{}", re.as_str()),
        }
    }
}

/// Trigger configuration as it appears in the portal config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerSet {
    /// Plain phrases, matched case-insensitively anywhere in the reply.
    pub phrases: Vec<String>,
    /// Regular expressions, compiled case-insensitive.
    pub patterns: Vec<String>,
}

impl Default for TriggerSet {
    fn default() -> Self {
        Self {
            phrases: DEFAULT_TRIGGER_PHRASES
                .iter()
                .map(|p| p.to_string())
                .collect(),
            patterns: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EscalationDetector {
    triggers: Vec<Trigger>,
}

impl EscalationDetector {
    pub fn new(triggers: Vec<Trigger>) -> Self {
        Self { triggers }
    }

    /// Compile a detector from configuration. Fails on the first invalid
    /// pattern.
    pub fn from_set(set: &TriggerSet) -> Result<Self, regex::Error> {
        let mut triggers: Vec<Trigger> = set.phrases.iter().map(Trigger::phrase).collect();
        for pattern in &set.patterns {
            triggers.push(Trigger::pattern(pattern)?);
        }
        Ok(Self { triggers })
    }

    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    /// True when any trigger matches the assistant reply.
    pub fn should_offer(&self, assistant_reply: &str) -> bool {
        let lowered = assistant_reply.to_lowercase();
        match self
            .triggers
            .iter()
            .find(|t| t.matches(assistant_reply, &lowered))
        {
            Some(trigger) => {
                tracing::debug!(trigger = %trigger.describe(), "Escalation trigger matched");
                true
            }
            None => false,
        }
    }
}

impl Default for EscalationDetector {
    fn default() -> Self {
        Self::new(DEFAULT_TRIGGER_PHRASES.iter().map(Trigger::phrase).collect())
    }
}

/// [`EscalationDetector::should_offer`] with the default trigger phrases.
pub fn should_offer(assistant_reply: &str) -> bool {
    EscalationDetector::default().should_offer(assistant_reply)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_triggers_case_insensitive() {
        assert!(should_offer("Please submit a Complaint now"));
        assert!(should_offer("You may want to file a FORMAL COMPLAINT."));
        assert!(!should_offer("everything is fine"));
    }

    #[test]
    fn test_substring_match_inside_longer_text() {
        assert!(should_offer(
            "If this persists, you can submit a formal complaint to the hostel office."
        ));
    }

    #[test]
    fn test_empty_trigger_set_never_offers() {
        let d = EscalationDetector::new(Vec::new());
        assert!(!d.should_offer("submit a complaint"));
    }

    #[test]
    fn test_custom_phrase_lowercased() {
        let d = EscalationDetector::new(vec![Trigger::phrase("Raise A Ticket")]);
        assert!(d.should_offer("you should raise a ticket"));
        assert!(!d.should_offer("submit a complaint"));
    }

    #[test]
    fn test_pattern_trigger() {
        let set = TriggerSet {
            phrases: Vec::new(),
            patterns: vec![r"escalat(e|ion)\s+to\s+(the\s+)?warden".to_string()],
        };
        let d = EscalationDetector::from_set(&set).unwrap();
        assert!(d.should_offer("I recommend ESCALATION TO THE WARDEN."));
        assert!(!d.should_offer("talk to the warden"));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let set = TriggerSet {
            phrases: Vec::new(),
            patterns: vec!["(unclosed".to_string()],
        };
        assert!(EscalationDetector::from_set(&set).is_err());
    }

    #[test]
    fn test_default_set_matches_default_detector() {
        let from_set = EscalationDetector::from_set(&TriggerSet::default()).unwrap();
        assert_eq!(from_set.triggers().len(), DEFAULT_TRIGGER_PHRASES.len());
        assert!(from_set.should_offer("submit a complaint"));
    }
}
