//! Tasktime Server binary.

use std::net::SocketAddr;
use std::sync::Arc;

use task_store::{MemoryTaskStore, SqliteTaskStore, TaskStore};
use tasktime_server::{
    config::Config, create_app, create_state, init_tracing, services::clock::SystemClock,
};
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env if present
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    init_tracing(&config.log_level);

    tracing::info!(
        database = %config.database_url,
        ai_enhance = config.openai_api_key.is_some(),
        "Starting Tasktime Server"
    );

    if config.uses_memory_store() {
        tracing::warn!("Using in-memory store, data is lost on shutdown");
        serve(config, MemoryTaskStore::new()).await
    } else {
        let store = SqliteTaskStore::connect(&config.database_url).await?;
        serve(config, store).await
    }
}

async fn serve<S: TaskStore + 'static>(config: Config, store: S) -> anyhow::Result<()> {
    let addr: SocketAddr = config.server_addr().parse()?;
    let state = create_state(config, store, Arc::new(SystemClock))?;
    let app = create_app(state);

    tracing::info!(addr = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, shutting down");
        }
    }
}
