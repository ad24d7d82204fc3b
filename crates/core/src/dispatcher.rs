//! The turn dispatcher drives one submission through the remote call and always
//! closes it with exactly one bot turn.
//!
//! A cycle runs `Idle -> Sending -> {Resolved | Failed} -> Idle`:
//! [`TurnDispatcher::begin`] commits the user turn and marks the conversation pending,
//! [`TurnDispatcher::exchange`] performs the call without touching the conversation,
//! and [`TurnDispatcher::resolve`] appends the bot turn and clears the pending flag.
//! [`TurnDispatcher::submit`] runs all three. If a `submit` future is dropped before
//! its reply arrives, the cycle is closed with the apology turn and the pending flag
//! is cleared.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::reply::{ReplyDecodeError, ReplyDecoder};
use crate::responder::LocalResponder;
use crate::store::ConversationState;
use crate::transport::{ChatTransport, OutboundMessage, TransportError};
use crate::turn::Turn;

/// Bot text appended when the exchange fails.
pub const APOLOGY_TEXT: &str = "Desculpe, tive um problema técnico. Pode tentar novamente?";

/// Where the bot text comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyMode {
    /// Trust the endpoint's reply body.
    #[default]
    Remote,
    /// Answer with the local responder; the endpoint only has to accept the message.
    Local,
}

impl ReplyMode {
    pub fn as_str(&self) -> &'static str {
        match &self {
            ReplyMode::Remote => "remote",
            ReplyMode::Local => "local",
        }
    }
}

impl fmt::Display for ReplyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Decode(#[from] ReplyDecodeError),
}

/// Origin of the bot turn that closed a cycle.
#[derive(Debug)]
pub enum ReplySource {
    /// Text taken from the endpoint's reply.
    Remote,
    /// The endpoint answered without usable text.
    NotUnderstood,
    /// Text produced by the local responder.
    Local,
    /// The exchange failed; the bot turn carries the apology text.
    Failed(DispatchError),
}

/// Outcome of one dispatch cycle.
#[derive(Debug)]
pub struct Resolution {
    pub user_turn: Turn,
    pub bot_turn: Turn,
    pub source: ReplySource,
}

impl Resolution {
    pub fn is_failure(&self) -> bool {
        matches!(self.source, ReplySource::Failed(_))
    }
}

/// In-flight record of a cycle, created by `begin` and consumed by `resolve`.
#[derive(Debug)]
pub struct DispatchTicket {
    user_turn: Turn,
    message: OutboundMessage,
    local_reply: Option<String>,
}

impl DispatchTicket {
    pub fn user_turn(&self) -> &Turn {
        &self.user_turn
    }

    pub fn message(&self) -> &OutboundMessage {
        &self.message
    }
}

pub struct TurnDispatcher {
    transport: Arc<dyn ChatTransport>,
    mode: ReplyMode,
    responder: LocalResponder,
    decoder: ReplyDecoder,
}

impl TurnDispatcher {
    pub fn new(transport: Arc<dyn ChatTransport>, mode: ReplyMode) -> Self {
        Self {
            transport,
            mode,
            responder: LocalResponder::default(),
            decoder: ReplyDecoder::default(),
        }
    }

    pub fn with_responder(mut self, responder: LocalResponder) -> Self {
        self.responder = responder;
        self
    }

    pub fn mode(&self) -> ReplyMode {
        self.mode
    }

    /// Commit the draft as a user turn and enter the sending state.
    ///
    /// Returns `None`, leaving the conversation untouched, when the draft is blank or
    /// a dispatch is already pending.
    pub fn begin(&self, state: &mut ConversationState) -> Option<DispatchTicket> {
        let draft = state.draft().to_string();
        let user_turn = state.append_user_turn(&draft)?;
        state.clear_draft();
        state.set_pending(true);

        let local_reply = match self.mode {
            ReplyMode::Local => Some(self.responder.reply(user_turn.text())),
            ReplyMode::Remote => None,
        };
        let message = OutboundMessage {
            message: user_turn.text().to_string(),
            message_id: user_turn.id().to_string(),
            timestamp: user_turn.timestamp(),
            response: local_reply.clone(),
        };

        Some(DispatchTicket {
            user_turn,
            message,
            local_reply,
        })
    }

    /// Perform the outbound call for `ticket`.
    #[instrument(skip_all, fields(message_id = %ticket.message.message_id))]
    pub async fn exchange(&self, ticket: &DispatchTicket) -> Result<String, TransportError> {
        self.transport.post(&ticket.message).await
    }

    /// Append the bot turn for `outcome` and leave the sending state.
    pub fn resolve(
        &self,
        state: &mut ConversationState,
        ticket: DispatchTicket,
        outcome: Result<String, TransportError>,
    ) -> Resolution {
        let (text, source) = self.reconcile(&ticket, outcome);
        let bot_turn = state.append_bot_turn(&text);
        state.set_pending(false);

        match &source {
            ReplySource::Failed(e) => warn!(
                "Dispatch of {} failed, replied with apology: {}",
                ticket.user_turn.id(),
                e
            ),
            source => info!(
                "Dispatch of {} resolved ({:?})",
                ticket.user_turn.id(),
                source
            ),
        }

        Resolution {
            user_turn: ticket.user_turn,
            bot_turn,
            source,
        }
    }

    /// Run a full cycle for the current draft.
    ///
    /// Never fails: every problem below this point ends up as a bot turn. Returns
    /// `None` when the submission was ignored.
    pub async fn submit(&self, state: &mut ConversationState) -> Option<Resolution> {
        let ticket = self.begin(state)?;
        let mut guard = PendingGuard::new(state);
        let outcome = self.exchange(&ticket).await;
        Some(self.resolve(guard.disarm(), ticket, outcome))
    }

    fn reconcile(
        &self,
        ticket: &DispatchTicket,
        outcome: Result<String, TransportError>,
    ) -> (String, ReplySource) {
        let body = match outcome {
            Ok(body) => body,
            Err(e) => return (APOLOGY_TEXT.to_string(), ReplySource::Failed(e.into())),
        };

        if let Some(local) = &ticket.local_reply {
            return (local.clone(), ReplySource::Local);
        }

        match self.decoder.decode(&body) {
            Ok(Some(text)) => (text, ReplySource::Remote),
            Ok(None) => (
                self.decoder.fallback().to_string(),
                ReplySource::NotUnderstood,
            ),
            Err(e) => (APOLOGY_TEXT.to_string(), ReplySource::Failed(e.into())),
        }
    }
}

/// Closes a cycle that was interrupted between `begin` and `resolve`.
struct PendingGuard<'a> {
    state: &'a mut ConversationState,
    armed: bool,
}

impl<'a> PendingGuard<'a> {
    fn new(state: &'a mut ConversationState) -> Self {
        Self { state, armed: true }
    }

    fn disarm(&mut self) -> &mut ConversationState {
        self.armed = false;
        &mut *self.state
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!("Dispatch dropped before its reply arrived, replied with apology");
            self.state.append_bot_turn(APOLOGY_TEXT);
            self.state.set_pending(false);
        }
    }
}
