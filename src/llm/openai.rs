//! OpenAI-compatible chat-completions client.
//!
//! Behaviour:
//! - `POST {base_url}/chat/completions` with a bearer credential.
//! - The system instruction goes first, then the history in order.
//! - The reply is `choices[0].message.content`, empty text included; a missing
//!   first choice is an error.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::error::{ProviderError, ProviderResult};
use super::{CompletionProvider, CompletionRequest};
use crate::config::{ApiKey, ProviderConfig};

/// Path appended to the configured base URL.
const CHAT_COMPLETIONS_PATH: &str = "chat/completions";

/// Longest slice of an error body kept for logs.
const MAX_ERROR_BODY_CHARS: usize = 512;

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Async client for an OpenAI-compatible endpoint.
#[derive(Clone, Debug)]
pub struct OpenAiProvider {
    client: Client,
    endpoint: Url,
}

impl OpenAiProvider {
    /// Build a provider from configuration.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client cannot be built.
    pub fn new(config: &ProviderConfig) -> ProviderResult<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()?;
        let endpoint = completions_url(&config.base_url)?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(
        &self,
        credential: &ApiKey,
        request: &CompletionRequest,
    ) -> ProviderResult<String> {
        let payload = build_payload(request);
        debug!(
            model = %request.model,
            messages = payload.messages.len(),
            "calling chat completions"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(credential.expose())
            .json(&payload)
            .send()
            .await
            .map_err(ProviderError::from_transport)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ProviderError::Unauthorized(status.as_u16()));
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }

        let body = response
            .bytes()
            .await
            .map_err(ProviderError::from_transport)?;
        if !status.is_success() {
            let text = String::from_utf8_lossy(&body);
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        parse_completion(&body)
    }
}

/// Resolve `{base}/chat/completions`, tolerating a base with or without a trailing slash.
fn completions_url(base_url: &str) -> ProviderResult<Url> {
    let mut base = Url::parse(base_url)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join(CHAT_COMPLETIONS_PATH)?)
}

fn build_payload(request: &CompletionRequest) -> ChatCompletionRequest<'_> {
    let mut messages = Vec::with_capacity(request.messages.len() + 1);
    messages.push(ApiMessage {
        role: "system",
        content: &request.system,
    });
    messages.extend(request.messages.iter().map(|m| ApiMessage {
        role: m.role.as_str(),
        content: &m.content,
    }));

    ChatCompletionRequest {
        model: &request.model,
        messages,
        temperature: request.temperature,
        max_tokens: request.max_output_tokens,
    }
}

fn parse_completion(body: &[u8]) -> ProviderResult<String> {
    let parsed: ChatCompletionResponse = serde_json::from_slice(body)?;
    parsed
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content.unwrap_or_default())
        .ok_or(ProviderError::EmptyCompletion)
}
