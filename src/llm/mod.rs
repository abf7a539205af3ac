//! Language-model provider seam.
//!
//! The relay talks to a [`CompletionProvider`]; production uses
//! [`openai::OpenAiProvider`], tests plug in stubs.

pub mod error;
pub mod openai;

pub use error::{ProviderError, ProviderErrorKind, ProviderResult};
pub use openai::OpenAiProvider;

use async_trait::async_trait;

use crate::chat::message::WireMessage;
use crate::config::ApiKey;

/// One text-generation call.
#[derive(Clone, Debug, PartialEq)]
pub struct CompletionRequest {
    /// Model identifier.
    pub model: String,
    /// System instruction, sent before the history.
    pub system: String,
    /// Conversation, oldest first.
    pub messages: Vec<WireMessage>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Ceiling on generated tokens.
    pub max_output_tokens: u32,
}

/// An opaque text-completion capability.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Generate the assistant reply for `request`.
    ///
    /// # Errors
    /// Returns a [`ProviderError`] for any transport, status or decoding failure.
    async fn complete(
        &self,
        credential: &ApiKey,
        request: &CompletionRequest,
    ) -> ProviderResult<String>;
}
