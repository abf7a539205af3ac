//! Conversation state held by the chat widget.
//!
//! A turn is a two-phase transition:
//! - [`ChatSession::begin_submit`] applies the user message optimistically and returns
//!   the payload to send;
//! - [`ChatSession::settle`] confirms with the assistant reply, or compensates with a
//!   fallback message and an error banner.
//!
//! The session does no I/O. [`ChatController`](super::controller::ChatController)
//! drives it against a relay.

use super::error::{FALLBACK_NOTICE, RelayFailure, SubmitRejection};
use super::ids::TurnId;
use super::message::{ChatReply, ChatRequest, Message};
use super::templates::{INITIAL_DRAFT, QuickPromptTemplate};

/// Final state of a settled turn.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TurnStatus {
    /// The relay replied and the answer was appended.
    Fulfilled,
    /// The relay failed and the fallback notice was appended.
    Failed,
}

/// A turn that has been applied optimistically and awaits the relay.
#[derive(Clone, Debug)]
pub struct PendingTurn {
    id: TurnId,
    request: ChatRequest,
}

impl PendingTurn {
    /// Turn identifier to pass back to [`ChatSession::settle`].
    #[must_use]
    pub const fn id(&self) -> TurnId {
        self.id
    }

    /// Payload for the relay: prior history plus the new user message.
    #[must_use]
    pub const fn request(&self) -> &ChatRequest {
        &self.request
    }
}

/// Point-in-time copy of the session, handed to views.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Conversation, oldest first.
    pub messages: Vec<Message>,
    /// Current draft input.
    pub draft: String,
    /// Title of the highlighted template.
    pub selected_template: Option<&'static str>,
    /// Whether a turn is in flight.
    pub loading: bool,
    /// Error banner text.
    pub error: Option<String>,
}

/// In-memory chat state for one page view.
#[derive(Debug)]
pub struct ChatSession {
    conversation: Vec<Message>,
    draft: String,
    selected_template: Option<&'static str>,
    in_flight: Option<TurnId>,
    error: Option<String>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    /// Open a session with the greeting draft and an empty conversation.
    #[must_use]
    pub fn new() -> Self {
        Self::with_draft(INITIAL_DRAFT)
    }

    /// Open a session with a custom draft.
    #[must_use]
    pub fn with_draft(draft: impl Into<String>) -> Self {
        Self {
            conversation: Vec::new(),
            draft: draft.into(),
            selected_template: None,
            in_flight: None,
            error: None,
        }
    }

    /// Conversation, oldest first.
    #[must_use]
    pub fn conversation(&self) -> &[Message] {
        &self.conversation
    }

    /// Current draft input.
    #[must_use]
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Title of the highlighted template.
    #[must_use]
    pub const fn selected_template(&self) -> Option<&'static str> {
        self.selected_template
    }

    /// Whether a turn is waiting for the relay.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Error banner text of the last failed turn.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether the send affordance should be enabled.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.is_loading() && !self.draft.trim().is_empty()
    }

    /// Replace the draft input (typing).
    ///
    /// Ignored while a turn is in flight; returns whether the edit applied.
    pub fn set_draft(&mut self, text: impl Into<String>) -> bool {
        if self.is_loading() {
            return false;
        }
        self.draft = text.into();
        true
    }

    /// Seed the draft from a template and highlight it.
    ///
    /// Ignored while a turn is in flight; returns whether the selection applied.
    pub fn select_template(&mut self, template: &'static QuickPromptTemplate) -> bool {
        if self.is_loading() {
            return false;
        }
        self.draft = template.prompt.to_string();
        self.selected_template = Some(template.title);
        true
    }

    /// Drop the template highlight.
    pub fn clear_template_selection(&mut self) {
        self.selected_template = None;
    }

    /// Optimistic phase of a turn.
    ///
    /// # Errors
    /// Returns [`SubmitRejection`] when `text` is blank or a turn is already in flight;
    /// the session is left untouched in both cases.
    pub fn begin_submit(&mut self, text: &str) -> Result<PendingTurn, SubmitRejection> {
        if text.trim().is_empty() {
            return Err(SubmitRejection::EmptyDraft);
        }
        if self.is_loading() {
            return Err(SubmitRejection::InFlight);
        }

        let id = TurnId::new();
        self.error = None;
        self.in_flight = Some(id);
        self.conversation.push(Message::user(text));
        self.draft.clear();

        let request = ChatRequest {
            messages: self.conversation.iter().map(Message::to_wire).collect(),
        };
        Ok(PendingTurn { id, request })
    }

    /// Reconciliation phase of a turn.
    ///
    /// Returns `None` when `turn` is not the turn in flight (stale or duplicate settle).
    pub fn settle(
        &mut self,
        turn: TurnId,
        outcome: Result<ChatReply, RelayFailure>,
    ) -> Option<TurnStatus> {
        if self.in_flight != Some(turn) {
            return None;
        }
        self.in_flight = None;

        match outcome {
            Ok(reply) => {
                self.conversation.push(Message::assistant(reply.content));
                Some(TurnStatus::Fulfilled)
            }
            Err(failure) => {
                self.conversation.push(Message::assistant(FALLBACK_NOTICE));
                self.error = Some(failure.banner_text());
                Some(TurnStatus::Failed)
            }
        }
    }

    /// Copy the visible state.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            messages: self.conversation.clone(),
            draft: self.draft.clone(),
            selected_template: self.selected_template,
            loading: self.is_loading(),
            error: self.error.clone(),
        }
    }
}
