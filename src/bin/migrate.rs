//! Create the advisory tables out-of-band.
//!
//! Connects with `MYSQL_PUBLIC_URL` when set, so the schema can be applied
//! from outside the deployment network; otherwise falls back to the discrete
//! `MYSQL*` settings.

use farm_advisor::config::{Config, ConnectionPurpose};
use farm_advisor::db;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone())),
        )
        .with_target(false)
        .init();

    info!("starting database migration");
    let store = db::connect(&cfg.database, ConnectionPurpose::Migrate).await?;
    match store.init_schema().await {
        Ok(()) => {
            info!(
                tables = "farmers, crops, land_assessments, profit_analysis",
                "all tables created"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "migration failed");
            Err(e.into())
        }
    }
}
