//! Drowsiness Monitor
//!
//! Runs detection sessions: a loop thread that turns camera frames into
//! drowsiness alerts, and a display thread that shows the latest results.

pub mod config;
pub mod detection;
pub mod display;
pub mod replay;
pub mod session;
pub mod snapshot;

pub use config::{LoopConfig, MonitorConfig};
pub use detection::{DetectionLoop, Iteration};
pub use display::{DisplayRefresher, DisplaySink, LogDisplay};
pub use replay::ReplayCollaborators;
pub use session::{Collaborators, Monitor};
pub use snapshot::{Publisher, Snapshots};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use camera_capture::CameraError;
use dms::DmsError;
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Monitor error types
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Failed to open frame source: {0}")]
    SourceInit(#[source] CameraError),

    #[error("Failed to initialise landmark detector: {0}")]
    DetectorInit(#[source] DmsError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration: {0}")]
    ConfigLoad(#[from] ::config::ConfigError),

    #[error("Failed to spawn thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Cooperative cancellation flag, checked once per loop iteration
#[derive(Debug, Clone, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Initialize logging
pub fn init_logging(level: &str) {
    let level = level.parse::<Level>().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_names(true)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}
