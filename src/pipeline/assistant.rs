//! The assistant loop
//!
//! Owns every stage of the pipeline and processes one request at a time:
//! input gate, resolver, confirmation gate, state machine, then either a
//! spoken reply or a knowledge lookup.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::confirm::{ConfirmationGate, GateDecision};
use crate::events::{CoreEvent, StatusText};
use crate::input::{InputEvent, InputGate};
use crate::knowledge::{KnowledgeChain, QueryResult};
use crate::resolver::{resolve, Resolution};
use crate::speech::SpeechRenderer;
use crate::state::{ActivationState, CommandToken, StateMachine};

/// Requests handled by the assistant loop
#[derive(Debug)]
pub enum AssistantRequest {
    Input(InputEvent),
    /// A command sent directly by a UI control, bypassing the resolver
    Command(CommandToken),
    Approve,
    Reject,
    SetConfirmation(bool),
    SetCaptions(bool),
    Status(oneshot::Sender<AssistantStatus>),
}

/// Snapshot of the session for status queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantStatus {
    pub version: String,
    pub state: ActivationState,
    pub muted: bool,
    pub voice_mode: bool,
    pub voice_profile: usize,
    pub input_locked: bool,
    pub confirmation_enabled: bool,
    pub pending_command: Option<CommandToken>,
    pub captions_enabled: bool,
    pub uptime_secs: u64,
}

/// Coordinates the command pipeline
pub struct Assistant {
    machine: StateMachine,
    gate: ConfirmationGate,
    renderer: SpeechRenderer,
    knowledge: KnowledgeChain,
    input_gate: InputGate,
    event_tx: broadcast::Sender<CoreEvent>,
    started_at: Instant,
}

impl Assistant {
    pub fn new(
        machine: StateMachine,
        gate: ConfirmationGate,
        renderer: SpeechRenderer,
        knowledge: KnowledgeChain,
        input_gate: InputGate,
        event_tx: broadcast::Sender<CoreEvent>,
    ) -> Self {
        Self {
            machine,
            gate,
            renderer,
            knowledge,
            input_gate,
            event_tx,
            started_at: Instant::now(),
        }
    }

    /// Process requests and console input until both channels close
    pub async fn run(
        &mut self,
        mut requests: mpsc::Receiver<AssistantRequest>,
        mut console: mpsc::Receiver<InputEvent>,
    ) {
        info!("assistant loop started in Offline state");

        let mut console_open = true;
        loop {
            tokio::select! {
                request = requests.recv() => match request {
                    Some(request) => self.handle(request).await,
                    None => break,
                },
                input = console.recv(), if console_open => match input {
                    Some(input) => self.handle_input(input).await,
                    None => {
                        debug!("console input closed");
                        console_open = false;
                    }
                },
            }
        }

        self.renderer.finish().await;
        info!("assistant loop stopped");
    }

    pub async fn handle(&mut self, request: AssistantRequest) {
        match request {
            AssistantRequest::Input(input) => self.handle_input(input).await,
            AssistantRequest::Command(cmd) => self.dispatch(cmd),
            AssistantRequest::Approve => self.approve(),
            AssistantRequest::Reject => self.reject(),
            AssistantRequest::SetConfirmation(enabled) => {
                if self.gate.set_enabled(enabled).is_some() {
                    let _ = self
                        .event_tx
                        .send(CoreEvent::ConfirmationResolved { approved: false });
                }
            }
            AssistantRequest::SetCaptions(enabled) => self.renderer.set_captions(enabled),
            AssistantRequest::Status(respond_to) => {
                let _ = respond_to.send(self.status());
            }
        }
    }

    /// Admit raw input and run it through the pipeline
    pub async fn handle_input(&mut self, input: InputEvent) {
        let text = match input {
            InputEvent::Utterance(transcript) => {
                if !self.machine.session().voice_mode {
                    debug!(transcript, "text mode, ignoring utterance");
                    return;
                }
                match self.input_gate.admit(&transcript, Instant::now()) {
                    Some(text) => text,
                    None => return,
                }
            }
            InputEvent::Typed(text) => text.trim().to_lowercase(),
        };

        if text.is_empty() {
            return;
        }
        self.submit(&text).await;
    }

    /// Resolve lower-cased text and act on it
    pub async fn submit(&mut self, text: &str) {
        match resolve(text) {
            Resolution::Command(cmd) => self.dispatch(cmd),
            Resolution::Clarify(reply) => {
                if self.machine.session().activated {
                    self.say(reply);
                } else {
                    debug!(text, "ignoring clarification while offline");
                }
            }
            Resolution::Query(query) => self.answer(&query).await,
        }
    }

    /// Pass a command through the confirmation gate
    pub fn dispatch(&mut self, cmd: CommandToken) {
        match self.gate.submit(cmd) {
            GateDecision::Execute(cmd) => self.execute(cmd),
            GateDecision::Held { .. } => {
                if let Some(pending) = self.gate.pending() {
                    let _ = self.event_tx.send(CoreEvent::ConfirmationRequested {
                        command: pending.clone(),
                    });
                }
            }
        }
    }

    pub fn approve(&mut self) {
        match self.gate.approve() {
            Some(cmd) => {
                let _ = self
                    .event_tx
                    .send(CoreEvent::ConfirmationResolved { approved: true });
                self.execute(cmd);
            }
            None => debug!("approve with nothing pending"),
        }
    }

    pub fn reject(&mut self) {
        match self.gate.reject() {
            Some(_) => {
                let _ = self
                    .event_tx
                    .send(CoreEvent::ConfirmationResolved { approved: false });
            }
            None => debug!("reject with nothing pending"),
        }
    }

    fn execute(&mut self, cmd: CommandToken) {
        if let Some(reply) = self.machine.execute(cmd) {
            self.say(&reply);
        }
    }

    /// Look an open-domain question up and speak the answer
    async fn answer(&mut self, query: &str) {
        if !self.machine.session().activated {
            debug!(query, "ignoring question while offline");
            return;
        }

        self.publish_status(StatusText::Thinking);
        self.say("Thinking");

        let reply = match self.knowledge.lookup(query).await {
            Ok(QueryResult::Found(text)) => text,
            Ok(QueryResult::NotFound) => "I could not find a clear answer".to_string(),
            Err(e) => {
                warn!(%e, query, "knowledge lookup failed");
                "Unable to fetch information".to_string()
            }
        };

        self.publish_status(StatusText::Active);
        self.say(&reply);
    }

    fn say(&mut self, reply: &str) {
        self.renderer.speak(reply, self.machine.session());
    }

    fn publish_status(&self, status: StatusText) {
        let _ = self.event_tx.send(CoreEvent::StatusChanged { status });
    }

    pub fn status(&self) -> AssistantStatus {
        let session = self.machine.session();
        AssistantStatus {
            version: env!("CARGO_PKG_VERSION").to_string(),
            state: self.machine.state(),
            muted: session.muted,
            voice_mode: session.voice_mode,
            voice_profile: session.voice_profile,
            input_locked: self.input_gate.is_locked(Instant::now()),
            confirmation_enabled: self.gate.is_enabled(),
            pending_command: self.gate.pending().cloned(),
            captions_enabled: self.renderer.captions_enabled(),
            uptime_secs: self.started_at.elapsed().as_secs(),
        }
    }
}
