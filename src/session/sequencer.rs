//! CDF handshake state machine
//!
//! Watches every message the backend sends toward the front-end and answers
//! three of them:
//!
//! ```text
//! initialize response      -> custom loadCdf { path: <active document> }
//! custom loadCdf ack       -> custom sourceContents
//! custom sourceContents    -> replace sources, open each one, restart
//! ```
//!
//! Each step is triggered by the backend's next message rather than by the
//! previous request returning, so the handshake is expressed as a state
//! machine over message shapes. Messages are observed, never altered.

use crate::common::Result;
use crate::dap::{
    custom_command, parse_source_contents, CustomRequest, ProtocolMessage, SourceEntry,
    CUSTOM_COMMAND,
};
use crate::vfs::{DocumentUri, SourceRepository};

use super::host::{DebugSession, Frontend, ShowOptions};

/// Where a session is in the handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandshakeState {
    #[default]
    AwaitingInitialize,
    AwaitingLoadCdfAck,
    AwaitingSourceContents,
}

impl std::fmt::Display for HandshakeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AwaitingInitialize => write!(f, "awaiting-initialize"),
            Self::AwaitingLoadCdfAck => write!(f, "awaiting-loadCdf-ack"),
            Self::AwaitingSourceContents => write!(f, "awaiting-sourceContents"),
        }
    }
}

/// A backend message reduced to the shapes the handshake cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observed {
    Initialize,
    LoadCdfAck,
    SourceContents(Vec<SourceEntry>),
    /// A recognized command whose body could not be parsed
    Malformed { command: String, reason: String },
    Unrecognized,
}

impl Observed {
    /// Classify a message coming from the backend
    pub fn classify(message: &ProtocolMessage) -> Self {
        let ProtocolMessage::Response(response) = message else {
            return Self::Unrecognized;
        };

        match response.command.as_str() {
            "initialize" => Self::Initialize,
            CUSTOM_COMMAND => match custom_command(response.body.as_ref()) {
                Some("loadCdf") => Self::LoadCdfAck,
                Some("sourceContents") => match parse_source_contents(response.body.as_ref()) {
                    Ok(sources) => Self::SourceContents(sources),
                    Err(e) => Self::Malformed {
                        command: "sourceContents".to_string(),
                        reason: e.to_string(),
                    },
                },
                _ => Self::Unrecognized,
            },
            _ => Self::Unrecognized,
        }
    }
}

/// Side effect requested by a transition, run in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send `loadCdf` with whatever document is active when the effect runs
    LoadActiveCdf,
    Request(CustomRequest),
    ReplaceSources(Vec<SourceEntry>),
    /// Open every repository document, one after the other
    OpenDocuments,
    Restart,
}

/// Result of one step of the state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: HandshakeState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn stay(state: HandshakeState) -> Self {
        Self {
            next: state,
            effects: Vec::new(),
        }
    }
}

/// Pure transition function of the handshake
///
/// `initialize` restarts the handshake from any state. Acks that arrive out
/// of order are ignored.
pub fn transition(state: HandshakeState, observed: Observed) -> Transition {
    use HandshakeState::*;

    match (state, observed) {
        (_, Observed::Initialize) => Transition {
            next: AwaitingLoadCdfAck,
            effects: vec![Effect::LoadActiveCdf],
        },
        (AwaitingLoadCdfAck, Observed::LoadCdfAck) => Transition {
            next: AwaitingSourceContents,
            effects: vec![Effect::Request(CustomRequest::SourceContents)],
        },
        (AwaitingSourceContents, Observed::SourceContents(sources)) => Transition {
            next: AwaitingInitialize,
            effects: vec![
                Effect::ReplaceSources(sources),
                Effect::OpenDocuments,
                Effect::Restart,
            ],
        },
        (state, _) => Transition::stay(state),
    }
}

/// Message interceptor driving the handshake for one debugging session
#[derive(Debug)]
pub struct Sequencer {
    state: HandshakeState,
    repository: SourceRepository,
    completed_rounds: u64,
}

impl Sequencer {
    /// Create a sequencer writing into `repository`
    pub fn new(repository: SourceRepository) -> Self {
        Self {
            state: HandshakeState::default(),
            repository,
            completed_rounds: 0,
        }
    }

    pub fn state(&self) -> HandshakeState {
        self.state
    }

    pub fn repository(&self) -> &SourceRepository {
        &self.repository
    }

    /// Number of `sourceContents` rounds fully handled
    pub fn completed_rounds(&self) -> u64 {
        self.completed_rounds
    }

    /// React to a message the backend sent toward the front-end
    ///
    /// Returns the state after the message. Unrecognized and malformed
    /// messages leave everything untouched. If an effect fails the state has
    /// still advanced; the remaining effects of that step are skipped.
    pub async fn on_did_send_message<S, F>(
        &mut self,
        message: &ProtocolMessage,
        session: &mut S,
        frontend: &mut F,
    ) -> Result<HandshakeState>
    where
        S: DebugSession + ?Sized,
        F: Frontend + ?Sized,
    {
        let observed = Observed::classify(message);

        match &observed {
            Observed::Unrecognized => return Ok(self.state),
            Observed::Malformed { command, reason } => {
                tracing::warn!(command = %command, reason = %reason, "Ignoring malformed backend message");
                return Ok(self.state);
            }
            _ => {}
        }

        let Transition { next, effects } = transition(self.state, observed);
        if effects.is_empty() {
            tracing::debug!(state = %self.state, command = ?message.command(), "Ignoring out-of-order handshake message");
            return Ok(self.state);
        }

        tracing::debug!(from = %self.state, to = %next, "Handshake transition");
        self.state = next;

        for effect in effects {
            self.apply(effect, session, frontend).await?;
        }

        Ok(self.state)
    }

    async fn apply<S, F>(&mut self, effect: Effect, session: &mut S, frontend: &mut F) -> Result<()>
    where
        S: DebugSession + ?Sized,
        F: Frontend + ?Sized,
    {
        match effect {
            Effect::LoadActiveCdf => {
                let path = frontend.active_document();
                if path.is_none() {
                    tracing::debug!("No active document, sending loadCdf without a path");
                }
                session.custom_request(CustomRequest::LoadCdf { path }).await
            }
            Effect::Request(request) => session.custom_request(request).await,
            Effect::ReplaceSources(sources) => {
                tracing::debug!(count = sources.len(), "Replacing virtual sources");
                self.repository.replace_all(sources);
                Ok(())
            }
            Effect::OpenDocuments => {
                for path in self.repository.keys() {
                    let uri = DocumentUri::from_source_path(&path);
                    frontend.open_document(&uri, ShowOptions::PERSISTENT).await?;
                    tracing::info!(document = %uri, "Opened virtual document");
                }
                Ok(())
            }
            Effect::Restart => {
                session.restart().await?;
                self.completed_rounds += 1;
                Ok(())
            }
        }
    }
}
