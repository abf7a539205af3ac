//! Error types for the client side of the chat flow.

use thiserror::Error;

/// Banner text when the failure carries no message of its own.
pub const GENERIC_ERROR_BANNER: &str = "حدث خطأ غير متوقع.";

/// Banner text when the relay answered non-2xx without an `error` field.
pub const REQUEST_FAILED_BANNER: &str = "Request failed";

/// Notice appended as an assistant message when a turn fails.
pub const FALLBACK_NOTICE: &str =
    "حدث خطأ أثناء المعالجة. تأكد من إعداد مفتاح OpenAI ثم حاول مرة أخرى.";

/// Why a turn could not get a reply from the relay.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RelayFailure {
    /// The relay answered with a non-success status.
    #[error("relay answered with status {status}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// `error` field of the body, when present.
        message: Option<String>,
    },

    /// The relay could not be reached.
    #[error("relay unreachable: {0}")]
    Transport(String),

    /// The relay did not answer in time.
    #[error("relay request timed out")]
    Timeout,

    /// The relay answered 2xx with a body that is not a reply.
    #[error("malformed relay response: {0}")]
    MalformedResponse(String),

    /// The turn was dropped before the relay answered.
    #[error("request abandoned before the relay answered")]
    Abandoned,

    /// The relay endpoint could not be built.
    #[error("invalid relay endpoint: {0}")]
    InvalidEndpoint(String),
}

impl RelayFailure {
    /// Text for the error banner.
    #[must_use]
    pub fn banner_text(&self) -> String {
        match self {
            Self::Rejected {
                message: Some(message),
                ..
            } => message.clone(),
            Self::Rejected { message: None, .. } => REQUEST_FAILED_BANNER.to_string(),
            _ => GENERIC_ERROR_BANNER.to_string(),
        }
    }
}

impl From<reqwest::Error> for RelayFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Why a submit was refused before anything was sent.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum SubmitRejection {
    /// The text is empty or whitespace-only.
    #[error("nothing to send")]
    EmptyDraft,
    /// Another turn is still waiting for the relay.
    #[error("a request is already in flight")]
    InFlight,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_prefers_relay_message() {
        let failure = RelayFailure::Rejected {
            status: 500,
            message: Some("Missing OPENAI_API_KEY".to_string()),
        };
        assert_eq!(failure.banner_text(), "Missing OPENAI_API_KEY");
    }

    #[test]
    fn test_banner_without_message() {
        let failure = RelayFailure::Rejected {
            status: 502,
            message: None,
        };
        assert_eq!(failure.banner_text(), REQUEST_FAILED_BANNER);
    }

    #[test]
    fn test_banner_for_transport_errors() {
        assert_eq!(RelayFailure::Timeout.banner_text(), GENERIC_ERROR_BANNER);
        assert_eq!(
            RelayFailure::Transport("refused".to_string()).banner_text(),
            GENERIC_ERROR_BANNER
        );
    }
}
