//! HTTP server for the BrandFlow relay.
//!
//! Provides:
//! - `POST /api/chat` completion relay
//! - `GET /api/templates` quick-prompt catalogue
//! - `GET /health`
//! - static landing-page assets as the fallback

pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::AppState;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the router with CORS and request tracing applied.
pub fn build_app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server with graceful shutdown support.
///
/// The server will stop accepting new connections when `shutdown_signal` completes.
///
/// # Errors
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn run_server_with_shutdown<F>(
    state: Arc<AppState>,
    port: u16,
    shutdown_signal: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("BrandFlow relay listening on http://{}", addr);

    axum::serve(listener, build_app(state))
        .with_graceful_shutdown(shutdown_signal)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::error::FALLBACK_NOTICE;
    use crate::chat::{ChatController, ChatSession, HttpRelayClient, Role, TurnStatus};
    use crate::config::{ApiKey, AppConfig};
    use crate::llm::{CompletionProvider, CompletionRequest, ProviderResult};
    use crate::relay::MISSING_CREDENTIAL_MESSAGE;
    use async_trait::async_trait;
    use std::time::Duration;

    /// Answers with the last user message reversed.
    struct MirrorProvider;

    #[async_trait]
    impl CompletionProvider for MirrorProvider {
        async fn complete(
            &self,
            _credential: &ApiKey,
            request: &CompletionRequest,
        ) -> ProviderResult<String> {
            let last = request.messages.last().map_or("", |m| m.content.as_str());
            Ok(last.chars().rev().collect())
        }
    }

    async fn spawn(config: &AppConfig) -> HttpRelayClient {
        let state = AppState::with_provider(Arc::new(MirrorProvider), config);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, build_app(state)).await;
        });
        HttpRelayClient::new(&format!("http://{addr}"), Duration::from_secs(5)).expect("client")
    }

    #[tokio::test]
    async fn test_session_round_trip_through_server() {
        let mut config = AppConfig::default();
        config.provider = config.provider.with_api_key("sk-test");
        let controller = ChatController::new(ChatSession::new(), spawn(&config).await);

        let status = controller.submit("abc").await.expect("accepted");
        assert_eq!(status, TurnStatus::Fulfilled);
        let snapshot = controller.snapshot();
        let roles: Vec<Role> = snapshot.messages.iter().map(|m| m.role()).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);
        assert_eq!(snapshot.messages[1].content(), "cba");
        assert!(!snapshot.loading);
        assert!(snapshot.error.is_none());
    }

    #[tokio::test]
    async fn test_missing_credential_reaches_banner() {
        let controller = ChatController::new(ChatSession::new(), spawn(&AppConfig::default()).await);

        let status = controller.submit("abc").await.expect("accepted");
        assert_eq!(status, TurnStatus::Failed);
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.messages.len(), 2);
        assert_eq!(snapshot.messages[1].content(), FALLBACK_NOTICE);
        assert_eq!(snapshot.error.as_deref(), Some(MISSING_CREDENTIAL_MESSAGE));
    }
}
