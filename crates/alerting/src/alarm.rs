//! Audible alarm playback

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Alarm error types
#[derive(Error, Debug)]
pub enum AlarmError {
    #[error("Alarm sound not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to start alarm player `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Alarm device error: {0}")]
    Device(String),
}

/// Alarm output. `trigger` returns promptly; playback continues in the background.
pub trait AlarmPlayer: Send + Sync {
    /// Start (or restart) the alarm
    fn trigger(&self) -> Result<(), AlarmError>;

    /// Stop any playback in progress
    fn silence(&self);
}

/// Alarm configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlarmConfig {
    /// Play a sound on alerts
    pub enabled: bool,
    /// Sound file handed to the player
    pub sound_file: PathBuf,
    /// External player program
    pub player_command: String,
    /// Arguments placed before the sound file
    pub player_args: Vec<String>,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sound_file: PathBuf::from("alarm.wav"),
            player_command: "aplay".to_string(),
            player_args: vec!["-q".to_string()],
        }
    }
}

/// Plays the alarm file through an external player process
pub struct CommandAlarm {
    config: AlarmConfig,
    playback: Mutex<Option<Child>>,
}

impl CommandAlarm {
    pub fn new(config: AlarmConfig) -> Self {
        info!(
            "Alarm player: {} {}",
            config.player_command,
            config.sound_file.display()
        );
        Self {
            config,
            playback: Mutex::new(None),
        }
    }

    /// Collect a player that has exited. Returns whether one is still running.
    fn reap(playback: &mut Option<Child>) -> bool {
        match playback.as_mut().map(|child| child.try_wait()) {
            Some(Ok(None)) => true,
            Some(status) => {
                debug!("Alarm player exited: {:?}", status);
                *playback = None;
                false
            }
            None => false,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Child>> {
        match self.playback.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn stop_child(child: &mut Child) {
        if let Err(e) = child.kill() {
            debug!("Alarm player already exited: {}", e);
        }
        let _ = child.wait();
    }
}

impl AlarmPlayer for CommandAlarm {
    fn trigger(&self) -> Result<(), AlarmError> {
        let mut playback = self.lock();
        if Self::reap(&mut playback) {
            if let Some(mut previous) = playback.take() {
                debug!("Restarting alarm playback");
                Self::stop_child(&mut previous);
            }
        }

        if !self.config.sound_file.exists() {
            return Err(AlarmError::FileNotFound(self.config.sound_file.clone()));
        }

        let child = Command::new(&self.config.player_command)
            .args(&self.config.player_args)
            .arg(&self.config.sound_file)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| AlarmError::Spawn {
                command: self.config.player_command.clone(),
                source,
            })?;

        debug!("Alarm playback started (pid {})", child.id());
        *playback = Some(child);
        Ok(())
    }

    fn silence(&self) {
        let mut playback = self.lock();
        if Self::reap(&mut playback) {
            if let Some(mut child) = playback.take() {
                debug!("Silencing alarm (pid {})", child.id());
                Self::stop_child(&mut child);
            }
        }
    }
}

impl Drop for CommandAlarm {
    fn drop(&mut self) {
        self.silence();
    }
}

/// Alarm that only logs; used when sound is disabled
#[derive(Debug, Default)]
pub struct SilentAlarm;

impl AlarmPlayer for SilentAlarm {
    fn trigger(&self) -> Result<(), AlarmError> {
        warn!("Alarm sound disabled; visual alert only");
        Ok(())
    }

    fn silence(&self) {}
}
