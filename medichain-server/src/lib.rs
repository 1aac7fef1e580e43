//! HTTP boundary for the medical chat workflow.
//!
//! Sessions live in memory for the lifetime of the process; an optional
//! [`MessageStore`](medichain_history::MessageStore) keeps transcripts and
//! seeds a session's history the first time it is seen.

mod config;
mod error;
mod routes;
mod state;

use tokio::net::TcpListener;

pub use config::ServerConfig;
pub use error::ServerError;
pub use routes::{router, ChatRequest, ChatResponse, HealthResponse};
pub use state::AppState;

/// Bind `config.bind_addr` and serve until Ctrl+C or SIGTERM. In-flight
/// requests complete before this returns.
pub async fn serve(config: &ServerConfig, state: AppState) -> std::io::Result<()> {
    let app = router(state, config);
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!(
        addr = %config.bind_addr,
        turn_timeout_secs = config.turn_timeout.as_secs(),
        "medical chat api listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("medical chat api stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
