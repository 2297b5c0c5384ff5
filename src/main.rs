use anyhow::{Context, Result};
use newsrank::{
    api,
    app_state::AppState,
    config::Config,
    ingest::{Scheduler, build_pipeline},
    middleware::rate_limit::RateLimit,
    repositories,
    telemetry,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

const MAX_DB_CONNECTIONS: u32 = 5;

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();

    let config = Config::from_env()?;

    let pool = repositories::connect(config.database_url(), MAX_DB_CONNECTIONS)
        .await
        .context("Error initializing database")?;
    let state = AppState::new(pool);

    let pipeline = Arc::new(build_pipeline(&config, state.store.clone())?);
    let scheduler = Scheduler::new(
        pipeline,
        config.feed_sources().to_vec(),
        config.fetch_interval(),
    );

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
                return;
            }
            info!("Received shutdown signal, initiating graceful shutdown...");
            shutdown.cancel();
        });
    }

    let scheduler_handle = tokio::spawn(scheduler.run(shutdown.clone()));

    let app = api::router(state, RateLimit::per_minute(config.rate_limit_per_minute()));
    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr()))?;
    info!("Server running on http://{}", listener.local_addr()?);

    let server_shutdown = shutdown.clone();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move { server_shutdown.cancelled().await })
    .await?;

    // the server can also stop on its own; make sure ingestion follows
    shutdown.cancel();
    scheduler_handle.await?;
    info!("Shutdown complete");
    Ok(())
}
