//! Drowsiness Monitor - Main Entry Point

use std::sync::Arc;

use alerting::{AlarmPlayer, CommandAlarm, SilentAlarm};
use anyhow::Context;
use monitor::{init_logging, LogDisplay, Monitor, MonitorConfig, ReplayCollaborators};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = MonitorConfig::load().context("loading configuration")?;
    init_logging(&config.log_level);

    info!("=== Drowsiness Monitor v{} ===", env!("CARGO_PKG_VERSION"));

    let alarm: Arc<dyn AlarmPlayer> = if config.alarm.enabled {
        Arc::new(CommandAlarm::new(config.alarm.clone()))
    } else {
        Arc::new(SilentAlarm)
    };
    let collaborators = Arc::new(ReplayCollaborators::from_config(&config));

    let mut monitor = Monitor::new(config, collaborators, alarm, Arc::new(LogDisplay))?;
    monitor.start().context("starting detection")?;

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");

    tokio::task::spawn_blocking(move || monitor.stop())
        .await?
        .context("stopping detection")?;

    Ok(())
}
