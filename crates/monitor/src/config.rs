//! Monitor configuration
//!
//! Defaults, then an optional TOML file, then `MONITOR__SECTION__KEY`
//! environment overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use alerting::{AlarmConfig, AlertConfig};
use camera_capture::CameraConfig;
use dms::{DmsConfig, DmsPreset};
use serde::{Deserialize, Serialize};

use crate::MonitorError;

/// Environment variable naming the config file
pub const CONFIG_PATH_VAR: &str = "MONITOR_CONFIG";

/// Config file used when `MONITOR_CONFIG` is unset
pub const DEFAULT_CONFIG_PATH: &str = "monitor.toml";

/// Detection loop timing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Minimum time between loop iterations (milliseconds)
    pub target_iteration_interval_ms: u64,
    /// Display refresh period (milliseconds)
    pub display_refresh_ms: u64,
    /// Longest `stop` waits for the running iteration (milliseconds)
    pub stop_timeout_ms: u64,
    /// Frames are downscaled to this size before detection
    pub analysis_width: u32,
    pub analysis_height: u32,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_iteration_interval_ms: 50,
            display_refresh_ms: 33,
            stop_timeout_ms: 1000,
            analysis_width: 480,
            analysis_height: 360,
        }
    }
}

impl LoopConfig {
    pub fn iteration_interval(&self) -> Duration {
        Duration::from_millis(self.target_iteration_interval_ms)
    }

    pub fn display_refresh(&self) -> Duration {
        Duration::from_millis(self.display_refresh_ms)
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }
}

/// Full monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Max tracing level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Landmark replay script (JSON)
    pub landmark_script: PathBuf,
    /// Base thresholds; keys under `[dms]` override individual values
    pub dms_preset: DmsPreset,
    pub camera: CameraConfig,
    pub dms: DmsConfig,
    pub alert: AlertConfig,
    pub alarm: AlarmConfig,
    pub detection: LoopConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            landmark_script: PathBuf::from("landmarks.json"),
            dms_preset: DmsPreset::Standard,
            camera: CameraConfig::default(),
            dms: DmsConfig::default(),
            alert: AlertConfig::default(),
            alarm: AlarmConfig::default(),
            detection: LoopConfig::default(),
        }
    }
}

impl MonitorConfig {
    /// Load from `$MONITOR_CONFIG` (or `monitor.toml`) and the environment
    pub fn load() -> Result<Self, MonitorError> {
        let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        Self::load_from(Path::new(&path))
    }

    /// Load from a specific file (missing file is fine) and the environment
    pub fn load_from(path: &Path) -> Result<Self, MonitorError> {
        let mut loaded: MonitorConfig = layered(path, None)?.try_deserialize()?;

        if loaded.dms_preset != DmsPreset::Standard {
            let base = config::Config::try_from(&PresetBase {
                dms: loaded.dms_preset.config(),
            })?;
            loaded = layered(path, Some(base))?.try_deserialize()?;
        }

        loaded.validate()?;
        Ok(loaded)
    }

    pub fn validate(&self) -> Result<(), MonitorError> {
        self.dms
            .validate()
            .map_err(|e| MonitorError::Config(e.to_string()))?;
        if self.alert.cooldown_seconds == 0 {
            return Err(MonitorError::Config("alert.cooldown_seconds must be positive".into()));
        }
        if self.detection.target_iteration_interval_ms == 0 || self.detection.display_refresh_ms == 0 {
            return Err(MonitorError::Config(
                "detection intervals must be positive".into(),
            ));
        }
        if self.detection.analysis_width == 0 || self.detection.analysis_height == 0 {
            return Err(MonitorError::Config("analysis size must be non-zero".into()));
        }
        Ok(())
    }
}

/// Preset thresholds, layered beneath the file and environment
#[derive(Serialize)]
struct PresetBase {
    dms: DmsConfig,
}

fn layered(path: &Path, base: Option<config::Config>) -> Result<config::Config, config::ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(base) = base {
        builder = builder.add_source(base);
    }
    builder
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix("MONITOR")
                .separator("__")
                .try_parsing(true),
        )
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MonitorConfig::default();
        assert_eq!(config.dms.ear_threshold, 0.21);
        assert_eq!(config.dms.frame_threshold, 15);
        assert_eq!(config.dms.head_tilt_threshold_degrees, 25.0);
        assert_eq!(config.alert.cooldown_seconds, 30);
        assert_eq!(config.detection.target_iteration_interval_ms, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = MonitorConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.alert.cooldown_seconds, 30);
    }

    #[test]
    fn test_file_overrides_partial_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monitor.toml");
        std::fs::write(
            &path,
            r#"
log_level = "debug"

[dms]
frame_threshold = 20

[alert]
cooldown_seconds = 10

[detection]
target_iteration_interval_ms = 40
"#,
        )
        .unwrap();

        let config = MonitorConfig::load_from(&path).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.dms.frame_threshold, 20);
        assert_eq!(config.dms.ear_threshold, 0.21);
        assert_eq!(config.alert.cooldown_seconds, 10);
        assert_eq!(config.detection.iteration_interval(), Duration::from_millis(40));
        assert_eq!(config.detection.analysis_width, 480);
    }

    #[test]
    fn test_preset_under_explicit_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monitor.toml");
        std::fs::write(&path, "dms_preset = \"strict\"\n\n[dms]\nframe_threshold = 12\n").unwrap();

        let config = MonitorConfig::load_from(&path).unwrap();
        assert_eq!(config.dms_preset, DmsPreset::Strict);
        assert_eq!(config.dms.ear_threshold, 0.23);
        assert_eq!(config.dms.head_tilt_threshold_degrees, 20.0);
        assert_eq!(config.dms.frame_threshold, 12);
    }

    #[test]
    fn test_invalid_file_values_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monitor.toml");
        std::fs::write(&path, "[dms]\nframe_threshold = 0\n").unwrap();

        assert!(matches!(
            MonitorConfig::load_from(&path),
            Err(MonitorError::Config(_))
        ));
    }

    #[test]
    fn test_zero_cooldown_rejected() {
        let mut config = MonitorConfig::default();
        config.alert.cooldown_seconds = 0;
        assert!(config.validate().is_err());
    }
}
