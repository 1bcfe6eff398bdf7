use anyhow::Result;
use pathbot_core::env_config::{env_optional, env_parse_with_default};
use pathbot_http::{AppState, Settings, create_router};
use pathbot_runner::{CodeRunner, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use std::sync::Arc;
use std::time::Duration;

use crate::open_store;

pub(crate) async fn run(port: u16, host: String) -> Result<()> {
    let store = open_store()?;
    let settings = Settings::from_env();
    let runner = build_runner();
    tracing::info!(
        admin_roles = ?settings.admin_roles,
        utc_offset_minutes = settings.utc_offset_minutes,
        session_ttl_secs = settings.session_ttl_secs,
        code_execution = runner.is_some(),
        "Command surface configured"
    );

    let state = Arc::new(AppState::new(store, runner, &settings));
    let router = create_router(state);
    let addr = format!("{host}:{port}");
    tracing::info!("Starting HTTP server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;
    tracing::info!("Server stopped");

    Ok(())
}

/// The execution relay, or `None` when no key is configured.
fn build_runner() -> Option<Arc<CodeRunner>> {
    let Some(api_key) = env_optional("RAPIDAPI_KEY") else {
        tracing::info!("RAPIDAPI_KEY not set, code execution disabled");
        return None;
    };
    let base_url = env_optional("JUDGE0_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
    let timeout = env_parse_with_default("PATHBOT_RUNNER_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS).max(1);
    match CodeRunner::new(api_key, &base_url, Duration::from_secs(timeout)) {
        Ok(runner) => Some(Arc::new(runner)),
        Err(e) => {
            tracing::warn!("Failed to initialize code runner: {}", e);
            None
        },
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl-C, shutting down"),
        Err(e) => tracing::warn!("Failed to listen for Ctrl-C: {}", e),
    }
}
