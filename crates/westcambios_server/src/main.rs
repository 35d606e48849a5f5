use anyhow::{Context, Result};
use tokio::sync::broadcast;
use tracing::info;
use westcambios_server::core::router::create_router;
use westcambios_server::core::setup::setup_components;
use westcambios_server::core::tasks::rate_refresh::RateRefreshTask;

#[tokio::main]
async fn main() -> Result<()> {
    let state = setup_components().await?;
    let app = create_router(state.clone()).await?;

    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let refresh_task = RateRefreshTask::new(state.clone());
    tokio::spawn(refresh_task.run(shutdown_tx.subscribe()));

    let addr = state.config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await
        .context("Server failed")?;

    Ok(())
}

async fn shutdown_signal(shutdown_tx: broadcast::Sender<()>) {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
    let _ = shutdown_tx.send(());
}
