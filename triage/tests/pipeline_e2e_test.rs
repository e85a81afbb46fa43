//! End-to-end tests for the conversation-to-complaint pipeline.
//!
//! Drives the conductor, composer and gateway together against scripted
//! in-memory services, validating the chat → offer → compose → classify flow.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use triage::{
    AdviceReply, AdviceRequest, AdviceService, ClassificationGateway, ClassificationRequest,
    ClassificationResponse, ClassificationService, ComplaintError, ComplaintForm, ComplaintId,
    Conductor, EscalationDetector, Requester, RequiredField, ServiceFailure, SubmitError,
    Transcript,
};

/// Advice service that replays a script and records every request.
struct ScriptedAdvice {
    replies: Mutex<VecDeque<Result<AdviceReply, ServiceFailure>>>,
    requests: Mutex<Vec<AdviceRequest>>,
}

impl ScriptedAdvice {
    fn new(script: Vec<Result<&str, ServiceFailure>>) -> Self {
        Self {
            replies: Mutex::new(
                script
                    .into_iter()
                    .map(|r| {
                        r.map(|text| AdviceReply {
                            reply: text.to_string(),
                        })
                    })
                    .collect(),
            ),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<AdviceRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl AdviceService for ScriptedAdvice {
    async fn advise(&self, request: &AdviceRequest) -> Result<AdviceReply, ServiceFailure> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ServiceFailure::Unreachable("script exhausted".into())))
    }
}

/// Classifier that returns a fixed outcome and counts calls.
struct FixedClassifier {
    outcome: Result<ClassificationResponse, ServiceFailure>,
    calls: Mutex<Vec<ClassificationRequest>>,
}

impl FixedClassifier {
    fn new(outcome: Result<ClassificationResponse, ServiceFailure>) -> Self {
        Self {
            outcome,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ClassificationService for FixedClassifier {
    async fn classify(
        &self,
        request: &ClassificationRequest,
    ) -> Result<ClassificationResponse, ServiceFailure> {
        self.calls.lock().unwrap().push(request.clone());
        self.outcome.clone()
    }
}

fn conductor() -> Conductor {
    Conductor::new(
        "Hi! Describe your problem.",
        EscalationDetector::default(),
        Duration::from_millis(1500),
    )
}

fn wifi_filed() -> ClassificationResponse {
    ClassificationResponse {
        id: ComplaintId::Number(42),
        category: "WiFi/Network".into(),
        sentiment: "high".into(),
        status: Some("pending".into()),
    }
}

/// Test: each resolved submit adds exactly two turns, plus one per offer
#[tokio::test]
async fn test_transcript_growth_per_submit() {
    let advice = ScriptedAdvice::new(vec![
        Ok("Try restarting your laptop."),
        Ok("If it continues, you can submit a formal complaint."),
        Err(ServiceFailure::Rejected {
            status: 503,
            message: None,
        }),
    ]);
    let mut c = conductor();

    let mut expected = 1;
    for text in ["laptop won't connect", "still failing", "hello?"] {
        let offer = c.submit(text, &advice).await.unwrap();
        expected += 2;
        assert_eq!(c.transcript().len(), expected);
        if let Some(offer) = offer {
            assert!(c.apply_offer(offer));
            expected += 1;
            assert_eq!(c.transcript().len(), expected);
        }
        assert!(!c.busy());
    }
    assert_eq!(expected, 8);
}

/// Test: blank input appends nothing and sends nothing
#[tokio::test]
async fn test_blank_input_never_reaches_service() {
    let advice = ScriptedAdvice::new(vec![Ok("unused")]);
    let mut c = conductor();

    assert_eq!(c.submit("", &advice).await, Err(SubmitError::EmptyMessage));
    assert_eq!(c.submit("   ", &advice).await, Err(SubmitError::EmptyMessage));
    assert_eq!(c.transcript().len(), 1);
    assert!(advice.requests().is_empty());
}

/// Test: request history mirrors the transcript right before the user turn
#[tokio::test]
async fn test_history_sent_in_transcript_order() {
    let advice = ScriptedAdvice::new(vec![Ok("first reply"), Ok("second reply")]);
    let mut c = conductor();

    c.submit("first", &advice).await.unwrap();
    let before: Vec<String> = c.transcript().to_history_strings().collect();
    c.submit("second", &advice).await.unwrap();

    let requests = advice.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].conversation_history, before);
    assert_eq!(requests[1].conversation_history.len(), 3);
    assert_eq!(requests[1].message, "second");
}

/// Test: wifi complaint flows from chat through offer to a filed complaint
#[tokio::test(start_paused = true)]
async fn test_wifi_chat_to_filed_complaint() {
    let advice = ScriptedAdvice::new(vec![Ok(
        "Please try reconnecting. If the outage persists you can submit a formal complaint.",
    )]);
    let mut c = conductor();

    let handed_off: Arc<Mutex<Option<Transcript>>> = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&handed_off);
    c.on_escalation_accepted(move |t| {
        *sink.lock().unwrap() = Some(t.clone());
    });

    let offer = c
        .submit("wifi is down in block B", &advice)
        .await
        .unwrap()
        .expect("reply mentions a formal complaint");
    assert_eq!(c.transcript().len(), 3);

    // Presentation delay, run on the paused clock.
    tokio::time::sleep(offer.delay).await;
    assert!(c.apply_offer(offer));
    assert_eq!(c.transcript().len(), 4);
    assert!(c.transcript().last().unwrap().escalation_offered());

    c.accept_escalation();
    let transcript = handed_off
        .lock()
        .unwrap()
        .take()
        .expect("hook received transcript");

    let requester = Requester::new("STU001", "Asha");
    let mut form = ComplaintForm::from_transcript(&transcript, &requester, Duration::ZERO);
    assert_eq!(form.draft().body_text(), "wifi is down in block B");
    assert!(form.based_on_chat());

    let classifier = Arc::new(FixedClassifier::new(Ok(wifi_filed())));
    let gateway = ClassificationGateway::new(Arc::clone(&classifier));
    form.submit(&gateway).await.unwrap();

    let filed = form.last_result().unwrap().as_ref().unwrap();
    assert_eq!(filed.complaint_id.to_string(), "42");
    assert_eq!(filed.priority.to_string(), "HIGH");
    assert_eq!(filed.status.to_string(), "Pending Review");
    assert_eq!(classifier.calls(), 1);
}

/// Test: empty requester name is rejected locally
#[tokio::test]
async fn test_empty_name_rejected_without_network() {
    let classifier = Arc::new(FixedClassifier::new(Ok(wifi_filed())));
    let gateway = ClassificationGateway::new(Arc::clone(&classifier));

    let mut t = Transcript::new("Hi!");
    t.append(triage::Turn::user("fan broken in room 12"));
    let draft = triage::compose(&t, "", "STU001");

    assert_eq!(
        gateway.submit(&draft).await,
        Err(ComplaintError::Validation(RequiredField::RequesterName))
    );
    assert_eq!(classifier.calls(), 0);
}

/// Test: skipping the chat yields an empty body that cannot be submitted
#[tokio::test]
async fn test_skip_chat_requires_manual_body() {
    let classifier = Arc::new(FixedClassifier::new(Ok(wifi_filed())));
    let gateway = ClassificationGateway::new(Arc::clone(&classifier));
    let c = conductor();

    let requester = Requester::new("STU002", "Ravi");
    let mut form = ComplaintForm::from_transcript(c.transcript(), &requester, Duration::ZERO);
    form.submit(&gateway).await.unwrap();
    assert_eq!(
        form.last_result(),
        Some(&Err(ComplaintError::Validation(RequiredField::BodyText)))
    );
    assert_eq!(classifier.calls(), 0);

    form.draft_mut().set_body("library AC not working");
    form.submit(&gateway).await.unwrap();
    assert!(form.last_result().unwrap().is_ok());
    assert_eq!(classifier.calls(), 1);
}

/// Test: a failed chat request leaves the conductor usable
#[tokio::test]
async fn test_recovery_after_connectivity_failure() {
    let advice = ScriptedAdvice::new(vec![
        Err(ServiceFailure::Unreachable("connection refused".into())),
        Ok("Glad to help."),
    ]);
    let mut c = conductor();

    assert_eq!(c.submit("hello", &advice).await, Ok(None));
    assert!(!c.busy());
    assert_eq!(
        c.transcript().last().unwrap().text(),
        triage::error::ADVICE_CONNECTIVITY_ERROR_TEXT
    );

    c.submit("hello again", &advice).await.unwrap();
    assert_eq!(c.transcript().last().unwrap().text(), "Glad to help.");
    assert_eq!(c.transcript().len(), 5);
}
