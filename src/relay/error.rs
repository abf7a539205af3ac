//! Failures of a single relay request.

use thiserror::Error;

use crate::llm::{ProviderError, ProviderErrorKind};

/// Returned to the caller when no credential is configured.
pub const MISSING_CREDENTIAL_MESSAGE: &str =
    "Missing OPENAI_API_KEY. Add it to your environment variables to enable the assistant.";

/// Returned to the caller for every other failure.
pub const PROVIDER_FAILURE_MESSAGE: &str =
    "حدث خطأ أثناء التواصل مع نموذج الذكاء الاصطناعي. حاول مرة أخرى.";

/// Why a relay request did not produce a reply.
#[derive(Debug, Error)]
pub enum RelayError {
    /// No provider credential is configured.
    #[error("provider credential is not configured")]
    MissingCredential,

    /// Request body is not JSON.
    #[error("request body is not valid JSON: {0}")]
    InvalidBody(#[source] serde_json::Error),

    /// A history entry is not a `{role, content}` pair.
    #[error("history entry {index} is malformed: {source}")]
    MalformedHistory {
        /// Position of the offending entry.
        index: usize,
        /// Decoding failure.
        #[source]
        source: serde_json::Error,
    },

    /// The provider call failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The provider did not answer in time.
    #[error("provider did not answer within the configured timeout")]
    Timeout,
}

impl RelayError {
    /// Message placed in the `error` field of the response body.
    #[must_use]
    pub const fn public_message(&self) -> &'static str {
        match self {
            Self::MissingCredential => MISSING_CREDENTIAL_MESSAGE,
            _ => PROVIDER_FAILURE_MESSAGE,
        }
    }

    /// Classification used in logs.
    #[must_use]
    pub const fn kind(&self) -> ProviderErrorKind {
        match self {
            Self::MissingCredential => ProviderErrorKind::Configuration,
            Self::InvalidBody(_) | Self::MalformedHistory { .. } => ProviderErrorKind::Protocol,
            Self::Timeout => ProviderErrorKind::Transient,
            Self::Provider(err) => err.kind(),
        }
    }
}

/// Convenience result alias for relay requests.
pub type RelayResult<T> = Result<T, RelayError>;
