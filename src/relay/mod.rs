//! Completion relay: turns a conversation history into one assistant reply.
//!
//! The relay is stateless. Each request carries the whole history; the relay
//! prepends the BrandFlow instruction and forwards it to the provider.

pub mod error;

pub use error::{MISSING_CREDENTIAL_MESSAGE, PROVIDER_FAILURE_MESSAGE, RelayError, RelayResult};

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error};

use crate::chat::message::{ChatReply, WireMessage};
use crate::config::ProviderConfig;
use crate::llm::{CompletionProvider, CompletionRequest};

/// Instruction sent ahead of every conversation.
pub const SYSTEM_PROMPT: &str = "You are BrandFlow, a bilingual (Arabic + English) AI creative director.
Your responsibilities:
- Produce social media design concepts, campaign ideas, writing in both languages when helpful.
- Build full brand identity systems: color palettes, typography, logo concepts, usage guidelines, motion principles.
- Generate detailed video and motion design briefs: storyboards, shot lists, script lines, voice-over, and music directions.
- Deliver output as structured, actionable plans with bullet lists, tables, and clear headings.
- Ask clarifying questions only when essential. Otherwise, make reasonable assumptions and keep the project moving.
- Always include production-ready details: dimensions, file formats, timeline estimates, asset checklists.
- End each response with a short \"Next Steps\" section summarizing what the client should do next.";

/// Stateless request handler in front of a [`CompletionProvider`].
#[derive(Clone)]
pub struct Relay {
    provider: Arc<dyn CompletionProvider>,
    config: ProviderConfig,
}

impl Relay {
    /// Create a relay over `provider`.
    #[must_use]
    pub fn new(provider: Arc<dyn CompletionProvider>, config: ProviderConfig) -> Self {
        Self { provider, config }
    }

    /// Handle one raw request body, logging any failure.
    ///
    /// The credential is checked before the body is looked at, so a
    /// misconfigured relay never calls the provider.
    ///
    /// # Errors
    /// Returns a [`RelayError`]; its `public_message` is what the caller sees.
    pub async fn handle(&self, body: &[u8]) -> RelayResult<ChatReply> {
        let result = self.complete(body).await;
        if let Err(err) = &result {
            error!(kind = ?err.kind(), error = %err, "chat relay failed");
        }
        result
    }

    async fn complete(&self, body: &[u8]) -> RelayResult<ChatReply> {
        let credential = self
            .config
            .api_key
            .as_ref()
            .ok_or(RelayError::MissingCredential)?;

        let history = parse_history(body)?;
        let request = self.build_request(history);
        debug!(messages = request.messages.len(), "relaying conversation");

        let content = tokio::time::timeout(
            self.config.request_timeout,
            self.provider.complete(credential, &request),
        )
        .await
        .map_err(|_| RelayError::Timeout)??;

        Ok(ChatReply { content })
    }

    fn build_request(&self, messages: Vec<WireMessage>) -> CompletionRequest {
        CompletionRequest {
            model: self.config.model.clone(),
            system: SYSTEM_PROMPT.to_string(),
            messages,
            temperature: self.config.temperature,
            max_output_tokens: self.config.max_output_tokens,
        }
    }
}

/// Extract the history from a request body.
///
/// A missing or non-array `messages` field is an empty history. Entries that are
/// not `{role, content}` with a known role are rejected.
///
/// # Errors
/// Returns [`RelayError::InvalidBody`] or [`RelayError::MalformedHistory`].
pub fn parse_history(body: &[u8]) -> RelayResult<Vec<WireMessage>> {
    let value: Value = serde_json::from_slice(body).map_err(RelayError::InvalidBody)?;
    let Some(Value::Array(entries)) = value.get("messages") else {
        return Ok(Vec::new());
    };

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            WireMessage::deserialize(entry)
                .map_err(|source| RelayError::MalformedHistory { index, source })
        })
        .collect()
}
