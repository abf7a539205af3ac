//! Error types for the completion provider.

use thiserror::Error;

/// Coarse classification of a provider failure.
///
/// The relay answers every failure the same way; the kind only feeds logs.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProviderErrorKind {
    /// Network trouble, timeouts, provider-side 5xx.
    Transient,
    /// Rejected credential or unusable endpoint.
    Configuration,
    /// Rate limit or exhausted quota.
    Quota,
    /// The provider answered something we could not use.
    Protocol,
}

/// Errors that can occur while calling the completion provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// Timeout waiting for the provider.
    #[error("provider request timed out")]
    Timeout,

    /// Provider refused the credential.
    #[error("provider rejected the credential (status {0})")]
    Unauthorized(u16),

    /// Rate limit or quota exceeded.
    #[error("provider rate limit exceeded")]
    RateLimited,

    /// Any other non-success status.
    #[error("provider returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Beginning of the response body.
        body: String,
    },

    /// Response body could not be decoded.
    #[error("malformed provider response: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    /// Response decoded but carried no choice.
    #[error("provider returned no completion choice")]
    EmptyCompletion,

    /// Provider base URL is unusable.
    #[error("invalid provider URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ProviderError {
    /// Map a transport error, separating timeouts.
    #[must_use]
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::HttpRequest(err)
        }
    }

    /// Classify the failure.
    #[must_use]
    pub const fn kind(&self) -> ProviderErrorKind {
        match self {
            Self::HttpRequest(_) | Self::Timeout => ProviderErrorKind::Transient,
            Self::Status { status, .. } if *status >= 500 => ProviderErrorKind::Transient,
            Self::Unauthorized(_) | Self::InvalidUrl(_) => ProviderErrorKind::Configuration,
            Self::RateLimited => ProviderErrorKind::Quota,
            Self::Status { .. } | Self::MalformedResponse(_) | Self::EmptyCompletion => {
                ProviderErrorKind::Protocol
            }
        }
    }
}

/// Convenience result alias for provider calls.
pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(ProviderError::Timeout.kind(), ProviderErrorKind::Transient);
        assert_eq!(ProviderError::RateLimited.kind(), ProviderErrorKind::Quota);
        assert_eq!(
            ProviderError::Unauthorized(401).kind(),
            ProviderErrorKind::Configuration
        );
        assert_eq!(
            ProviderError::Status {
                status: 503,
                body: String::new()
            }
            .kind(),
            ProviderErrorKind::Transient
        );
        assert_eq!(
            ProviderError::Status {
                status: 400,
                body: String::new()
            }
            .kind(),
            ProviderErrorKind::Protocol
        );
        assert_eq!(ProviderError::EmptyCompletion.kind(), ProviderErrorKind::Protocol);
    }
}
