//! Chat relay daemon entry point.
//!
//! Binary name: `chatrelayd`
//!
//! Loads settings from the environment, wires the application state, and
//! serves the HTTP/WebSocket API until interrupted.

mod http;
mod state;

use chatrelay_infra::config::Settings;

use http::router::build_router;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let enable_otel = std::env::var("CHATRELAY_OTEL").is_ok_and(|v| v == "1");
    chatrelay_observe::tracing_setup::init_tracing(enable_otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let settings = Settings::from_env();
    tracing::info!(addr = %settings.bind_addr, test_mode = settings.test_mode, "starting chatrelay");

    let state = AppState::init(&settings).await?;
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.bind_addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    chatrelay_observe::tracing_setup::shutdown_tracing();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
    tracing::info!("shutdown signal received");
}
