//! Interactive console session.
//!
//! Reads one command per line and drives a [`Conductor`] (chat mode) or a
//! [`ComplaintForm`] (form mode). Scheduled effects returned by the library
//! (escalation offers, form dismissal) are executed here with
//! `tokio::time::sleep`.
//!
//! The session is generic over its input and output so tests can script a
//! whole conversation against in-memory buffers.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};
use tracing::{debug, info};

use triage::{
    AdviceService, ClassificationGateway, ClassificationService, Conductor, ComplaintForm,
    ConfigError, FormError, PortalConfig, Requester, SubmitError, Transcript,
};

use crate::render;

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("console I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("complaint form: {0}")]
    Form(#[from] FormError),

    #[error("failed to serialize transcript: {0}")]
    Json(#[from] serde_json::Error),
}

/// A line typed in chat mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Message(String),
    Complaint,
    NewChat,
    Export,
    Help,
    Quit,
    Unknown(String),
}

impl ChatCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        match line {
            "/complaint" => Self::Complaint,
            "/new" => Self::NewChat,
            "/export" => Self::Export,
            "/help" => Self::Help,
            "/quit" | "/exit" => Self::Quit,
            _ if line.starts_with('/') => Self::Unknown(line.to_string()),
            _ => Self::Message(line.to_string()),
        }
    }
}

/// A line typed in form mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormCommand {
    Append(String),
    Body(String),
    Name(String),
    Category(Option<String>),
    Show,
    Submit,
    Cancel,
    Help,
    Quit,
    Unknown(String),
}

impl FormCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };
        match head {
            "/body" => Self::Body(rest.to_string()),
            "/name" => Self::Name(rest.to_string()),
            "/category" if rest.is_empty() => Self::Category(None),
            "/category" => Self::Category(Some(rest.to_string())),
            "/show" => Self::Show,
            "/submit" => Self::Submit,
            "/cancel" | "/back" => Self::Cancel,
            "/help" => Self::Help,
            "/quit" | "/exit" => Self::Quit,
            _ if head.starts_with('/') => Self::Unknown(head.to_string()),
            _ => Self::Append(line.to_string()),
        }
    }
}

enum FormExit {
    BackToChat,
    Quit,
}

pub struct Session<A, C> {
    conductor: Conductor,
    advice: A,
    gateway: ClassificationGateway<C>,
    requester: Requester,
    dismiss_delay: Duration,
    handoff: Arc<Mutex<Option<Transcript>>>,
}

impl<A, C> Session<A, C>
where
    A: AdviceService,
    C: ClassificationService,
{
    pub fn new(
        config: &PortalConfig,
        requester: Requester,
        advice: A,
        classifier: C,
    ) -> Result<Self, ConsoleError> {
        let mut conductor = Conductor::from_config(config)?;

        // The form opens from whatever transcript the hook last received.
        let handoff: Arc<Mutex<Option<Transcript>>> = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&handoff);
        conductor.on_escalation_accepted(move |transcript| {
            if let Ok(mut slot) = sink.lock() {
                *slot = Some(transcript.clone());
            }
        });

        Ok(Self {
            conductor,
            advice,
            gateway: ClassificationGateway::new(classifier),
            requester,
            dismiss_delay: config.presentation.dismiss_delay(),
            handoff,
        })
    }

    pub fn conductor(&self) -> &Conductor {
        &self.conductor
    }

    /// Run until `/quit` or end of input.
    pub async fn run<R, W>(&mut self, input: R, output: &mut W) -> Result<(), ConsoleError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        info!(
            session_id = %self.conductor.session_id(),
            student_id = %self.requester.id,
            "Portal session started"
        );

        self.print_transcript(output).await?;
        write(output, "Type /help for commands.\n").await?;

        loop {
            write(output, "you> ").await?;
            let Some(line) = lines.next_line().await? else {
                break;
            };

            match ChatCommand::parse(&line) {
                ChatCommand::Message(text) => self.chat(&text, output).await?,
                ChatCommand::Complaint => {
                    if let FormExit::Quit = self.complaint(&mut lines, output).await? {
                        break;
                    }
                }
                ChatCommand::NewChat => match self.conductor.new_chat() {
                    Ok(()) => self.print_transcript(output).await?,
                    Err(e) => write(output, &format!("Cannot start a new chat: {}\n", e)).await?,
                },
                ChatCommand::Export => {
                    let json = serde_json::to_string_pretty(self.conductor.transcript())?;
                    write(output, &format!("{}\n", json)).await?;
                }
                ChatCommand::Help => write(output, render::CHAT_HELP).await?,
                ChatCommand::Quit => break,
                ChatCommand::Unknown(cmd) => {
                    write(output, &format!("Unknown command {}. Type /help.\n", cmd)).await?
                }
            }
        }

        info!(
            session_id = %self.conductor.session_id(),
            turns = self.conductor.transcript().len(),
            "Portal session ended"
        );
        Ok(())
    }

    async fn chat<W>(&mut self, text: &str, output: &mut W) -> Result<(), ConsoleError>
    where
        W: AsyncWrite + Unpin,
    {
        let offer = match self.conductor.submit(text, &self.advice).await {
            Ok(offer) => offer,
            // Blank lines are ignored.
            Err(SubmitError::EmptyMessage) => return Ok(()),
            Err(e) => {
                write(output, &format!("Cannot send: {}\n", e)).await?;
                return Ok(());
            }
        };

        if let Some(reply) = self.conductor.transcript().last() {
            write(output, &render::turn(reply)).await?;
        }

        if let Some(offer) = offer {
            tokio::time::sleep(offer.delay).await;
            if self.conductor.apply_offer(offer) {
                if let Some(turn) = self.conductor.transcript().last() {
                    write(output, &render::turn(turn)).await?;
                }
            }
        }
        Ok(())
    }

    async fn complaint<R, W>(
        &mut self,
        lines: &mut Lines<R>,
        output: &mut W,
    ) -> Result<FormExit, ConsoleError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        self.conductor.accept_escalation();
        let handed_off = self.handoff.lock().ok().and_then(|mut slot| slot.take());
        let mut form = match handed_off {
            Some(transcript) => {
                ComplaintForm::from_transcript(&transcript, &self.requester, self.dismiss_delay)
            }
            None => ComplaintForm::blank(&self.requester, self.dismiss_delay),
        };
        debug!(based_on_chat = form.based_on_chat(), "Complaint form opened");

        write(output, &render::draft(&form)).await?;
        write(output, "Type /help for form commands.\n").await?;

        loop {
            write(output, "form> ").await?;
            let Some(line) = lines.next_line().await? else {
                return Ok(FormExit::Quit);
            };

            match FormCommand::parse(&line) {
                FormCommand::Append(text) => {
                    if text.is_empty() {
                        continue;
                    }
                    let body = form.draft().body_text();
                    let body = if body.trim().is_empty() {
                        text
                    } else {
                        format!("{} {}", body, text)
                    };
                    form.draft_mut().set_body(body);
                }
                FormCommand::Body(text) => form.draft_mut().set_body(text),
                FormCommand::Name(name) => form.draft_mut().set_requester_name(name),
                FormCommand::Category(Some(hint)) => form.draft_mut().set_category(hint),
                FormCommand::Category(None) => form.draft_mut().clear_category(),
                FormCommand::Show => write(output, &render::draft(&form)).await?,
                FormCommand::Submit => {
                    write(output, "Submitting...\n").await?;
                    let dismiss = form.submit(&self.gateway).await?;
                    if let Some(result) = form.last_result() {
                        write(output, &render::result(result)).await?;
                    }
                    if let Some(dismiss) = dismiss {
                        tokio::time::sleep(dismiss.delay).await;
                        write(output, "Returning to chat.\n").await?;
                        return Ok(FormExit::BackToChat);
                    }
                }
                FormCommand::Cancel => {
                    write(output, "Back to chat.\n").await?;
                    return Ok(FormExit::BackToChat);
                }
                FormCommand::Help => write(output, render::FORM_HELP).await?,
                FormCommand::Quit => return Ok(FormExit::Quit),
                FormCommand::Unknown(cmd) => {
                    write(output, &format!("Unknown command {}. Type /help.\n", cmd)).await?
                }
            }
        }
    }

    async fn print_transcript<W>(&self, output: &mut W) -> Result<(), ConsoleError>
    where
        W: AsyncWrite + Unpin,
    {
        for turn in self.conductor.transcript().turns() {
            write(output, &render::turn(turn)).await?;
        }
        Ok(())
    }
}

async fn write<W>(output: &mut W, text: &str) -> Result<(), ConsoleError>
where
    W: AsyncWrite + Unpin,
{
    output.write_all(text.as_bytes()).await?;
    output.flush().await?;
    Ok(())
}
