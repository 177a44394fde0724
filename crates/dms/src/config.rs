//! DMS configuration

use serde::{Deserialize, Serialize};

use crate::DmsError;

/// Named threshold sets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DmsPreset {
    #[default]
    Standard,
    /// Reacts sooner
    Strict,
    /// Fewer false positives
    Lenient,
}

impl DmsPreset {
    pub fn config(self) -> DmsConfig {
        match self {
            DmsPreset::Standard => DmsConfig::default(),
            DmsPreset::Strict => DmsConfig::strict(),
            DmsPreset::Lenient => DmsConfig::lenient(),
        }
    }
}

/// DMS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DmsConfig {
    /// Average EAR below which a frame counts as eyes-closed
    pub ear_threshold: f32,

    /// Consecutive eyes-closed frames before the closure is trusted
    pub frame_threshold: u32,

    /// Head tilt (degrees from horizontal) treated as drowsy
    pub head_tilt_threshold_degrees: f32,
}

impl Default for DmsConfig {
    fn default() -> Self {
        Self {
            ear_threshold: 0.21,
            frame_threshold: 15,
            head_tilt_threshold_degrees: 25.0,
        }
    }
}

impl DmsConfig {
    /// Create strict config (reacts sooner)
    pub fn strict() -> Self {
        Self {
            ear_threshold: 0.23,
            frame_threshold: 10,
            head_tilt_threshold_degrees: 20.0,
        }
    }

    /// Create lenient config (fewer false positives)
    pub fn lenient() -> Self {
        Self {
            ear_threshold: 0.19,
            frame_threshold: 25,
            head_tilt_threshold_degrees: 35.0,
        }
    }

    /// Reject values the analysis cannot work with
    pub fn validate(&self) -> Result<(), DmsError> {
        if !(self.ear_threshold > 0.0 && self.ear_threshold < 1.0) {
            return Err(DmsError::Config(format!(
                "ear_threshold must be in (0, 1), got {}",
                self.ear_threshold
            )));
        }
        if self.frame_threshold == 0 {
            return Err(DmsError::Config("frame_threshold must be at least 1".into()));
        }
        if !(self.head_tilt_threshold_degrees > 0.0 && self.head_tilt_threshold_degrees < 90.0) {
            return Err(DmsError::Config(format!(
                "head_tilt_threshold_degrees must be in (0, 90), got {}",
                self.head_tilt_threshold_degrees
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert!(DmsConfig::default().validate().is_ok());
        assert!(DmsConfig::strict().validate().is_ok());
        assert!(DmsConfig::lenient().validate().is_ok());
    }

    #[test]
    fn test_preset_names() {
        let preset: DmsPreset = serde_json::from_str("\"strict\"").unwrap();
        assert_eq!(preset, DmsPreset::Strict);
        assert_eq!(preset.config().frame_threshold, 10);
        assert_eq!(DmsPreset::default().config().ear_threshold, 0.21);
        assert_eq!(DmsPreset::Lenient.config().head_tilt_threshold_degrees, 35.0);
    }

    #[test]
    fn test_rejects_zero_frame_threshold() {
        let config = DmsConfig {
            frame_threshold: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(DmsError::Config(_))));
    }

    #[test]
    fn test_rejects_out_of_range_tilt() {
        let config = DmsConfig {
            head_tilt_threshold_degrees: 120.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
