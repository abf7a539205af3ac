//! Application state shared across all request handlers.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::llm::{CompletionProvider, OpenAiProvider, ProviderResult};
use crate::relay::Relay;

/// Shared application state.
pub struct AppState {
    /// Relay in front of the completion provider.
    pub relay: Relay,
    /// Directory served for non-API paths.
    pub static_dir: PathBuf,
}

impl AppState {
    /// Create state backed by the OpenAI-compatible provider.
    ///
    /// # Errors
    /// Returns an error if the provider client cannot be created.
    pub fn new(config: &AppConfig) -> ProviderResult<Arc<Self>> {
        let provider = OpenAiProvider::new(&config.provider)?;
        Ok(Self::with_provider(Arc::new(provider), config))
    }

    /// Create state around an existing provider.
    #[must_use]
    pub fn with_provider(provider: Arc<dyn CompletionProvider>, config: &AppConfig) -> Arc<Self> {
        Arc::new(Self {
            relay: Relay::new(provider, config.provider.clone()),
            static_dir: config.server.static_dir.clone(),
        })
    }
}
