//! Transport from the chat widget to the completion relay.

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use super::error::RelayFailure;
use super::message::{ChatReply, ChatRequest, ErrorBody};

/// Route served by the relay.
pub const CHAT_ROUTE: &str = "/api/chat";

/// Anything that can carry a [`ChatRequest`] to the relay.
#[async_trait]
pub trait RelayClient: Send + Sync {
    /// Send the history and wait for the assistant reply.
    ///
    /// # Errors
    /// Returns a [`RelayFailure`] for transport errors, timeouts, non-2xx answers and
    /// malformed replies.
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, RelayFailure>;
}

/// HTTP client for `POST /api/chat`.
#[derive(Clone, Debug)]
pub struct HttpRelayClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpRelayClient {
    /// Build a client for the relay at `base_url` (e.g. `http://127.0.0.1:3000`).
    ///
    /// # Errors
    /// Returns [`RelayFailure::InvalidEndpoint`] if the URL does not parse or the HTTP
    /// client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RelayFailure> {
        let endpoint = chat_url(base_url)
            .map_err(|e| RelayFailure::InvalidEndpoint(format!("{base_url}: {e}")))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RelayFailure::InvalidEndpoint(e.to_string()))?;

        Ok(Self { client, endpoint })
    }

    /// Full URL requests are posted to.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

/// Resolve `{base}/api/chat`, keeping any path prefix of the base.
fn chat_url(base_url: &str) -> Result<Url, url::ParseError> {
    let mut base = Url::parse(base_url)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(CHAT_ROUTE.trim_start_matches('/'))
}

#[async_trait]
impl RelayClient for HttpRelayClient {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, RelayFailure> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .map(|b| b.error);
            return Err(RelayFailure::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice::<ChatReply>(&body)
            .map_err(|e| RelayFailure::MalformedResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::post;

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{addr}")
    }

    #[test]
    fn test_endpoint_is_chat_route() {
        let client =
            HttpRelayClient::new("http://localhost:3000", Duration::from_secs(5)).expect("client");
        assert_eq!(client.endpoint().as_str(), "http://localhost:3000/api/chat");
    }

    #[test]
    fn test_endpoint_keeps_path_prefix() {
        let client = HttpRelayClient::new("http://host/brandflow", Duration::from_secs(5))
            .expect("client");
        assert_eq!(client.endpoint().as_str(), "http://host/brandflow/api/chat");
        let client = HttpRelayClient::new("http://host/brandflow/", Duration::from_secs(5))
            .expect("client");
        assert_eq!(client.endpoint().as_str(), "http://host/brandflow/api/chat");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = HttpRelayClient::new("not a url", Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, RelayFailure::InvalidEndpoint(_)));
    }

    #[tokio::test]
    async fn test_success_reply() {
        let app = Router::new().route(
            CHAT_ROUTE,
            post(|axum::Json(req): axum::Json<ChatRequest>| async move {
                axum::Json(ChatReply {
                    content: format!("{} messages", req.messages.len()),
                })
            }),
        );
        let base = spawn(app).await;
        let client = HttpRelayClient::new(&base, Duration::from_secs(5)).expect("client");

        let request = ChatRequest {
            messages: vec![crate::chat::message::WireMessage::user("hi")],
        };
        let reply = client.send(&request).await.expect("reply");
        assert_eq!(reply.content, "1 messages");
    }

    #[tokio::test]
    async fn test_error_body_is_extracted() {
        let app = Router::new().route(
            CHAT_ROUTE,
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    axum::Json(ErrorBody {
                        error: "nope".to_string(),
                    }),
                )
            }),
        );
        let base = spawn(app).await;
        let client = HttpRelayClient::new(&base, Duration::from_secs(5)).expect("client");

        let err = client.send(&ChatRequest::default()).await.unwrap_err();
        assert_eq!(
            err,
            RelayFailure::Rejected {
                status: 500,
                message: Some("nope".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_non_json_error_has_no_message() {
        let app = Router::new().route(CHAT_ROUTE, post(|| async { StatusCode::BAD_GATEWAY }));
        let base = spawn(app).await;
        let client = HttpRelayClient::new(&base, Duration::from_secs(5)).expect("client");

        let err = client.send(&ChatRequest::default()).await.unwrap_err();
        assert_eq!(
            err,
            RelayFailure::Rejected {
                status: 502,
                message: None,
            }
        );
    }

    #[tokio::test]
    async fn test_malformed_success_body() {
        let app = Router::new().route(CHAT_ROUTE, post(|| async { "plain text" }));
        let base = spawn(app).await;
        let client = HttpRelayClient::new(&base, Duration::from_secs(5)).expect("client");

        let err = client.send(&ChatRequest::default()).await.unwrap_err();
        assert!(matches!(err, RelayFailure::MalformedResponse(_)));
    }
}
