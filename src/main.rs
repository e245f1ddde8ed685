use anyhow::Result;
use tracing_subscriber::EnvFilter;

use burnscout::config::BurnScoutConfig;
use burnscout::report::BurnPlanner;
use burnscout::web;

#[tokio::main]
async fn main() -> Result<()> {
    let config = BurnScoutConfig::load()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Starting BurnScout v{}", burnscout::VERSION);

    let planner = BurnPlanner::from_config(&config)?;
    web::run(planner, config.server.port).await
}
