//! Driver Monitoring System (DMS)
//!
//! Per-frame drowsiness analysis from facial landmarks:
//! - Eye aspect ratio (EAR) per eye
//! - Consecutive-frame debouncing of eye closure
//! - Head tilt from the outer eye corners

pub mod analysis;
pub mod config;
pub mod debounce;
pub mod detector;
pub mod geometry;
pub mod landmarks;

pub use analysis::{DmsAlert, DmsAnalysis, FaceMetrics};
pub use config::{DmsConfig, DmsPreset};
pub use debounce::DebounceCounter;
pub use detector::{LandmarkDetector, LandmarkScript, ScriptedDetector};
pub use geometry::{eye_aspect_ratio, head_tilt_angle, EyeOpenness};
pub use landmarks::{LandmarkSet, Point2};

use thiserror::Error;
use tracing::debug;

/// DMS error types
#[derive(Error, Debug)]
pub enum DmsError {
    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Keypoints missing: expected {expected}, found {found}")]
    KeypointsMissing { expected: usize, found: usize },

    #[error("Degenerate eye geometry")]
    DegenerateGeometry,
}

/// Driver monitoring module.
///
/// Tracks one face per frame: when several are detected, the one with the
/// largest landmark extent (normally the driver, closest to the camera)
/// drives the eye-closure counter.
pub struct DmsModule {
    config: DmsConfig,
    debounce: DebounceCounter,
}

impl DmsModule {
    /// Create a new DMS module with configuration
    pub fn new(config: DmsConfig) -> Result<Self, DmsError> {
        config.validate()?;
        Ok(Self {
            debounce: DebounceCounter::from_config(&config),
            config,
        })
    }

    pub fn config(&self) -> &DmsConfig {
        &self.config
    }

    /// Analyze the faces detected in a single frame.
    ///
    /// A frame without a usable face leaves the debounce state untouched.
    pub fn analyze(&mut self, faces: &[LandmarkSet]) -> DmsAnalysis {
        let face_count = faces.len();

        let Some(face) = select_primary(faces) else {
            return DmsAnalysis::default();
        };

        let measured = geometry::eye_openness(face)
            .and_then(|eyes| geometry::face_tilt(face).map(|tilt| (eyes, tilt)));
        let (eyes, tilt_degrees) = match measured {
            Ok(measured) => measured,
            Err(e) => {
                debug!("Skipping face: {}", e);
                return DmsAnalysis {
                    face_count,
                    ..Default::default()
                };
            }
        };

        let eyes_closed = self.debounce.observe(eyes.average);

        let mut alerts = Vec::new();
        if eyes_closed {
            alerts.push(DmsAlert::EyesClosed);
        }
        if tilt_degrees > self.config.head_tilt_threshold_degrees {
            alerts.push(DmsAlert::HeadTilted);
        }

        DmsAnalysis {
            face_count,
            metrics: Some(FaceMetrics {
                eyes,
                tilt_degrees,
                closed_frames: self.debounce.count(),
            }),
            alerts,
        }
    }

    /// Reset driver state
    pub fn reset_state(&mut self) {
        self.debounce.reset();
    }
}

fn select_primary(faces: &[LandmarkSet]) -> Option<&LandmarkSet> {
    faces
        .iter()
        .max_by(|a, b| a.bounding_area().total_cmp(&b.bounding_area()))
}
