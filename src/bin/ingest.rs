use anyhow::{Context, Result};
use newsrank::{
    config::Config,
    ingest::{build_pipeline, run_round},
    repositories::{self, ArticleRepository},
    telemetry,
};
use std::sync::Arc;
use tracing::info;

/// Run exactly one ingestion round over the configured sources and exit.
#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();

    let config = Config::from_env()?;
    let pool = repositories::connect(config.database_url(), 5)
        .await
        .context("Error initializing database")?;
    let repository = ArticleRepository::new(pool);

    let pipeline = Arc::new(build_pipeline(&config, Arc::new(repository.clone()))?);
    let report = run_round(pipeline, config.feed_sources()).await;

    info!(
        "Round finished: {} stored, {} duplicates, {} skipped, {}/{} sources failed, {} articles total",
        report.stored,
        report.duplicates,
        report.skipped,
        report.sources_failed,
        report.sources_ok + report.sources_failed,
        repository.count().await?
    );
    Ok(())
}
