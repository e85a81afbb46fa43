//! Conversation Conductor: turn-taking over one chat session.
//!
//! ```text
//! Idle ──begin(text)──▶ AwaitingReply ──complete(outcome)──▶ Idle
//!                           │                   │
//!                  user turn appended   reply / error turn appended
//!                  request returned     detector runs → Option<ScheduledOffer>
//! ```
//!
//! `begin` and `complete` are split so a front end can show `busy()` while the
//! request is in flight and a test can drive the machine without a network.
//! `submit` runs both halves against an [`AdviceService`].
//!
//! The conductor is the only writer of its transcript. Offer turns are
//! returned as [`ScheduledOffer`] values and appended through
//! [`Conductor::apply_offer`] when the caller decides to show them.

pub mod state;

pub use state::{ConductorState, IllegalTransition, StateMachine, TransitionRecord};

use std::time::Duration;

use uuid::Uuid;

use crate::config::{ConfigError, PortalConfig};
use crate::error::{SubmitError, ADVICE_CONNECTIVITY_ERROR_TEXT, ADVICE_SERVICE_ERROR_TEXT};
use crate::escalation::{EscalationDetector, ESCALATION_OFFER_TEXT};
use crate::service::{AdviceReply, AdviceRequest, AdviceService, ServiceFailure};
use crate::transcript::{Transcript, Turn};

/// Called with the current transcript when the user accepts escalation.
pub type EscalationHook = Box<dyn FnMut(&Transcript) + Send>;

/// An escalation offer waiting to be shown. Not `Clone`: each offer is
/// applied at most once.
#[derive(Debug, PartialEq, Eq)]
pub struct ScheduledOffer {
    /// How long the front end should wait before applying the offer.
    pub delay: Duration,
    offer_id: Uuid,
    session_id: Uuid,
    turn: Turn,
}

impl ScheduledOffer {
    pub fn text(&self) -> &str {
        self.turn.text()
    }
}

pub struct Conductor {
    session_id: Uuid,
    greeting: String,
    transcript: Transcript,
    machine: StateMachine,
    detector: EscalationDetector,
    offer_delay: Duration,
    /// Id of the offer issued by the last reply and not yet applied.
    pending_offer: Option<Uuid>,
    hooks: Vec<EscalationHook>,
}

impl Conductor {
    pub fn new(
        greeting: impl Into<String>,
        detector: EscalationDetector,
        offer_delay: Duration,
    ) -> Self {
        let greeting = greeting.into();
        Self {
            session_id: Uuid::new_v4(),
            transcript: Transcript::new(greeting.clone()),
            greeting,
            machine: StateMachine::new(),
            detector,
            offer_delay,
            pending_offer: None,
            hooks: Vec::new(),
        }
    }

    pub fn from_config(config: &PortalConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(
            config.greeting.clone(),
            config.detector()?,
            config.presentation.offer_delay(),
        ))
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn state(&self) -> ConductorState {
        self.machine.current()
    }

    /// True while an advice request is outstanding.
    pub fn busy(&self) -> bool {
        self.state() == ConductorState::AwaitingReply
    }

    pub fn transitions(&self) -> &[TransitionRecord] {
        self.machine.transitions()
    }

    /// Append the user turn and return the advice request to send.
    ///
    /// The request's history is the transcript as it stood before this user
    /// turn. Rejected input leaves the transcript untouched.
    pub fn begin(&mut self, user_text: &str) -> Result<AdviceRequest, SubmitError> {
        if user_text.trim().is_empty() {
            return Err(SubmitError::EmptyMessage);
        }
        if self.busy() {
            return Err(SubmitError::Busy);
        }

        let request = AdviceRequest {
            message: user_text.to_string(),
            conversation_history: self.transcript.to_history_strings().collect(),
        };

        self.machine
            .advance(ConductorState::AwaitingReply, Some("user turn submitted"))
            .map_err(|_| SubmitError::Busy)?;
        self.transcript.append(Turn::user(user_text));

        tracing::info!(
            session_id = %self.session_id,
            turns = self.transcript.len(),
            history = request.conversation_history.len(),
            "Advice request issued"
        );
        Ok(request)
    }

    /// Apply the outcome of the outstanding advice request.
    ///
    /// Returns the escalation offer to schedule, if the reply triggered one.
    pub fn complete(
        &mut self,
        outcome: Result<AdviceReply, ServiceFailure>,
    ) -> Result<Option<ScheduledOffer>, SubmitError> {
        if !self.busy() {
            return Err(SubmitError::NotAwaiting);
        }

        let offer = match outcome {
            Ok(AdviceReply { reply }) => {
                let offer = self.detector.should_offer(&reply).then(|| ScheduledOffer {
                    delay: self.offer_delay,
                    offer_id: Uuid::new_v4(),
                    session_id: self.session_id,
                    turn: Turn::escalation_offer(ESCALATION_OFFER_TEXT),
                });
                if let Some(offer) = &offer {
                    self.pending_offer = Some(offer.offer_id);
                }
                self.transcript.append(Turn::assistant(reply));
                tracing::info!(
                    session_id = %self.session_id,
                    turns = self.transcript.len(),
                    offer = offer.is_some(),
                    "Advice reply appended"
                );
                offer
            }
            Err(failure) => {
                tracing::warn!(
                    session_id = %self.session_id,
                    error = %failure,
                    "Advice request failed"
                );
                let text = if failure.is_connectivity() {
                    ADVICE_CONNECTIVITY_ERROR_TEXT
                } else {
                    ADVICE_SERVICE_ERROR_TEXT
                };
                self.transcript.append(Turn::assistant(text));
                None
            }
        };

        self.machine
            .advance(ConductorState::Idle, Some("reply applied"))
            .map_err(|_| SubmitError::NotAwaiting)?;
        Ok(offer)
    }

    /// `begin`, call the service, `complete`.
    pub async fn submit(
        &mut self,
        user_text: &str,
        service: &dyn AdviceService,
    ) -> Result<Option<ScheduledOffer>, SubmitError> {
        let request = self.begin(user_text)?;
        let outcome = service.advise(&request).await;
        self.complete(outcome)
    }

    /// Append a scheduled offer turn. Offers from an earlier session, offers
    /// superseded by a later reply and offers already applied are dropped;
    /// returns whether the turn was appended.
    pub fn apply_offer(&mut self, offer: ScheduledOffer) -> bool {
        if offer.session_id != self.session_id {
            tracing::debug!(session_id = %self.session_id, "Dropping offer from previous session");
            return false;
        }
        if self.pending_offer != Some(offer.offer_id) {
            tracing::debug!(session_id = %self.session_id, "Dropping offer that is no longer pending");
            return false;
        }
        self.pending_offer = None;
        self.transcript.append(offer.turn);
        true
    }

    /// Start a new chat: fresh transcript, new session id. Hooks stay
    /// registered.
    pub fn new_chat(&mut self) -> Result<(), SubmitError> {
        if self.busy() {
            return Err(SubmitError::Busy);
        }
        self.session_id = Uuid::new_v4();
        self.transcript = Transcript::new(self.greeting.clone());
        self.machine = StateMachine::new();
        self.pending_offer = None;
        tracing::info!(session_id = %self.session_id, "New chat session");
        Ok(())
    }

    pub fn on_escalation_accepted<F>(&mut self, handler: F)
    where
        F: FnMut(&Transcript) + Send + 'static,
    {
        self.hooks.push(Box::new(handler));
    }

    /// The user acted on an escalation offer (or skipped the chat). Every
    /// registered hook receives the current transcript.
    pub fn accept_escalation(&mut self) {
        tracing::info!(
            session_id = %self.session_id,
            turns = self.transcript.len(),
            offered = self.transcript.escalation_offered(),
            "Escalation accepted"
        );
        for hook in &mut self.hooks {
            hook(&self.transcript);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::MockAdviceService;
    use std::sync::{Arc, Mutex};

    fn conductor() -> Conductor {
        Conductor::new("Hi!", EscalationDetector::default(), Duration::ZERO)
    }

    fn reply(text: &str) -> Result<AdviceReply, ServiceFailure> {
        Ok(AdviceReply {
            reply: text.to_string(),
        })
    }

    #[test]
    fn test_empty_input_rejected_without_side_effects() {
        let mut c = conductor();
        assert_eq!(c.begin(""), Err(SubmitError::EmptyMessage));
        assert_eq!(c.begin("   \n\t"), Err(SubmitError::EmptyMessage));
        assert_eq!(c.transcript().len(), 1);
        assert!(!c.busy());
        assert!(c.transitions().is_empty());
    }

    #[test]
    fn test_begin_sets_busy_and_blocks_second_submit() {
        let mut c = conductor();
        c.begin("wifi down").unwrap();
        assert!(c.busy());
        assert_eq!(c.state(), ConductorState::AwaitingReply);

        assert_eq!(c.begin("hello?"), Err(SubmitError::Busy));
        assert_eq!(c.transcript().len(), 2);
    }

    #[test]
    fn test_request_history_excludes_new_user_turn() {
        let mut c = conductor();
        let req = c.begin("wifi down").unwrap();
        assert_eq!(req.message, "wifi down");
        assert_eq!(req.conversation_history, vec!["assistant: Hi!".to_string()]);

        c.complete(reply("restart the router")).unwrap();
        let req = c.begin("still down").unwrap();
        assert_eq!(
            req.conversation_history,
            vec![
                "assistant: Hi!".to_string(),
                "user: wifi down".to_string(),
                "assistant: restart the router".to_string(),
            ]
        );
    }

    #[test]
    fn test_complete_without_request_rejected() {
        let mut c = conductor();
        assert_eq!(c.complete(reply("x")), Err(SubmitError::NotAwaiting));
        assert_eq!(c.transcript().len(), 1);
    }

    #[test]
    fn test_distinct_error_turns() {
        let mut c = conductor();
        c.begin("a").unwrap();
        c.complete(Err(ServiceFailure::Rejected {
            status: 500,
            message: None,
        }))
        .unwrap();
        c.begin("b").unwrap();
        c.complete(Err(ServiceFailure::Unreachable("refused".into())))
            .unwrap();

        let turns = c.transcript().turns();
        assert_eq!(turns[2].text(), ADVICE_SERVICE_ERROR_TEXT);
        assert_eq!(turns[4].text(), ADVICE_CONNECTIVITY_ERROR_TEXT);
        assert_ne!(turns[2].text(), turns[4].text());
        assert!(!c.busy());
    }

    #[test]
    fn test_offer_scheduled_and_applied() {
        let mut c = conductor();
        c.begin("mess food is stale").unwrap();
        let offer = c
            .complete(reply("You can submit a formal complaint to the mess committee."))
            .unwrap()
            .expect("offer expected");
        assert_eq!(c.transcript().len(), 3);
        assert_eq!(offer.text(), ESCALATION_OFFER_TEXT);

        assert!(c.apply_offer(offer));
        let last = c.transcript().last().unwrap();
        assert!(last.escalation_offered());
        assert_eq!(c.transcript().len(), 4);
    }

    #[test]
    fn test_stale_offer_dropped_after_new_chat() {
        let mut c = conductor();
        let old_session = c.session_id();
        c.begin("x").unwrap();
        let offer = c.complete(reply("submit a complaint")).unwrap().unwrap();

        c.new_chat().unwrap();
        assert_ne!(c.session_id(), old_session);
        assert!(!c.apply_offer(offer));
        assert_eq!(c.transcript().len(), 1);
        assert_eq!(c.transcript().turns()[0].text(), "Hi!");
    }

    #[test]
    fn test_offer_applied_at_most_once() {
        let mut c = conductor();
        c.begin("mess food is stale").unwrap();
        let offer = c
            .complete(reply("You can submit a formal complaint."))
            .unwrap()
            .unwrap();
        let duplicate = ScheduledOffer {
            delay: offer.delay,
            offer_id: offer.offer_id,
            session_id: offer.session_id,
            turn: offer.turn.clone(),
        };

        assert!(c.apply_offer(offer));
        assert!(!c.apply_offer(duplicate));
        assert_eq!(c.transcript().len(), 4);
        assert_eq!(
            c.transcript()
                .turns()
                .iter()
                .filter(|t| t.escalation_offered())
                .count(),
            1
        );
    }

    #[test]
    fn test_superseded_offer_dropped() {
        let mut c = conductor();
        c.begin("a").unwrap();
        let first = c.complete(reply("submit a complaint")).unwrap().unwrap();
        c.begin("b").unwrap();
        let second = c.complete(reply("a formal complaint it is")).unwrap().unwrap();

        assert!(!c.apply_offer(first));
        assert!(c.apply_offer(second));
        assert_eq!(c.transcript().len(), 6);
    }

    #[test]
    fn test_new_chat_rejected_while_busy() {
        let mut c = conductor();
        c.begin("x").unwrap();
        assert_eq!(c.new_chat(), Err(SubmitError::Busy));
        assert_eq!(c.transcript().len(), 2);
    }

    #[test]
    fn test_hooks_receive_transcript() {
        let mut c = conductor();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        c.on_escalation_accepted(move |t| {
            sink.lock()
                .unwrap()
                .extend(t.user_texts().map(str::to_string));
        });

        c.begin("projector broken").unwrap();
        c.complete(reply("noted")).unwrap();
        c.accept_escalation();

        assert_eq!(*seen.lock().unwrap(), vec!["projector broken".to_string()]);
    }

    #[tokio::test]
    async fn test_submit_calls_service_once() {
        let mut service = MockAdviceService::new();
        service
            .expect_advise()
            .withf(|req| {
                req.message == "wifi is down in block B" && req.conversation_history.len() == 1
            })
            .times(1)
            .returning(|_| {
                Ok(AdviceReply {
                    reply: "Try forgetting the network.".into(),
                })
            });

        let mut c = conductor();
        let offer = c.submit("wifi is down in block B", &service).await.unwrap();
        assert!(offer.is_none());
        assert_eq!(c.transcript().len(), 3);
        assert_eq!(c.transitions().len(), 2);
        assert!(!c.busy());
    }

    #[tokio::test]
    async fn test_blank_submit_never_calls_service() {
        let mut service = MockAdviceService::new();
        service.expect_advise().times(0);

        let mut c = conductor();
        assert_eq!(
            c.submit("   ", &service).await,
            Err(SubmitError::EmptyMessage)
        );
        assert_eq!(c.transcript().len(), 1);
    }
}
