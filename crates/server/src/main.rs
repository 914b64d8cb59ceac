mod bootstrap;
mod scheduler;

use anyhow::Result;
use brainbot_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use brainbot_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations.
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;
    let shutdown = app.service.shutdown_signal();

    tracing::info!(
        armed_timers = app.scheduler.armed_count(),
        "brainbot started"
    );
    app.pump.start().await?;

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
            tracing::info!("interrupt received");
        }
        _ = shutdown.notified() => {
            tracing::info!("stop command received");
        }
    }

    tracing::info!("brainbot stopping");
    app.db_pool.close().await;
    Ok(())
}
