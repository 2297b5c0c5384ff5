use anyhow::Result;
use newsrank::{config::Config, repositories, telemetry};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();

    let config = Config::from_env()?;
    // connect() applies pending migrations; no-op if up-to-date
    repositories::connect(config.database_url(), 1).await?;
    info!("Migrations applied to {}", config.database_url());

    Ok(())
}
