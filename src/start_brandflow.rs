//! Startup helpers for the BrandFlow relay server.

use std::process::ExitCode;
use std::sync::Arc;

use crate::config::{API_KEY_ENV, AppConfig};
use crate::server::{self, AppState};

/// Install the `tracing` subscriber used by both binaries.
///
/// `RUST_LOG` refines the default `info` level.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();
}

/// Run the server (used by the `brandflow` binary).
///
/// # Returns
/// `ExitCode::SUCCESS` on graceful shutdown, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    init_tracing();

    tracing::info!("Starting BrandFlow v{}", env!("CARGO_PKG_VERSION"));

    let (config, state) = match initialize() {
        Ok(v) => v,
        Err(e) => {
            tracing::error!("Failed to initialize: {e}");
            return ExitCode::from(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    let served = rt.block_on(server::run_server_with_shutdown(
        state,
        config.server.port,
        shutdown_signal(),
    ));
    if let Err(e) = served {
        tracing::error!("Server error: {e}");
        return ExitCode::from(1);
    }

    tracing::info!("BrandFlow stopped");
    ExitCode::SUCCESS
}

/// Load configuration and build application state without starting the server.
///
/// # Errors
/// Returns an error if configuration is invalid or state creation fails.
pub fn initialize() -> Result<(AppConfig, Arc<AppState>), Box<dyn std::error::Error + Send + Sync>> {
    let config = AppConfig::from_env()?;
    tracing::info!(
        model = %config.provider.model,
        provider = %config.provider.base_url,
        "provider configured"
    );
    if config.provider.api_key.is_none() {
        tracing::warn!("{API_KEY_ENV} is not set; chat requests will be refused");
    }

    let state = AppState::new(&config)?;
    Ok((config, state))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
