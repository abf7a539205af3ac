//! HTTP route handlers for the BrandFlow API.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::services::ServeDir;

use crate::chat::client::CHAT_ROUTE;
use crate::chat::message::{ChatReply, ErrorBody};
use crate::chat::templates::QUICK_PROMPTS;

use super::state::AppState;

/// Route serving the quick-prompt catalogue.
pub const TEMPLATES_ROUTE: &str = "/api/templates";

/// Create the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    let assets = ServeDir::new(&state.static_dir);
    Router::new()
        .route("/health", get(health_check))
        .route(CHAT_ROUTE, post(chat_completion))
        .route(TEMPLATES_ROUTE, get(list_templates))
        .fallback_service(assets)
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "brandflow",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Quick-prompt catalogue, in display order.
async fn list_templates() -> impl IntoResponse {
    Json(&QUICK_PROMPTS)
}

/// Relay one conversation to the provider.
///
/// The body is taken raw so that non-JSON input gets the same 500 as any
/// other failure instead of axum's rejection.
async fn chat_completion(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ChatReply>, (StatusCode, Json<ErrorBody>)> {
    state.relay.handle(&body).await.map(Json).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                error: e.public_message().to_string(),
            }),
        )
    })
}
