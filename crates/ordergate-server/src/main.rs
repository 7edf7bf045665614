//! ordergate broadcast server.
//!
//! - WebSocket endpoint: /v1/broadcast (binary envelope frames in, JSON status out)
//! - Config: first CLI argument, default `ordergate.yaml`
//! - Ctrl-C: drain (refuse new streams, halt sinks) then stop

use tracing_subscriber::{fmt, EnvFilter};

use ordergate_core::error::{OrderGateError, Result};
use ordergate_server::{app_state::AppState, config, router};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "ordergate-server failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "ordergate.yaml".to_string());
    let cfg = config::load_from_file(&path)?;
    let listen = cfg.listen_addr()?;

    let state = AppState::new(cfg)?;
    let app = router::build_router(state.clone());

    tracing::info!(%listen, "ordergate-server starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| OrderGateError::Internal(format!("bind {listen} failed: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await
        .map_err(|e| OrderGateError::Internal(format!("server failed: {e}")))
}

async fn shutdown_signal(state: AppState) {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::warn!("ctrl-c handler unavailable; running until killed");
        std::future::pending::<()>().await;
    }
    state.begin_drain();
}
