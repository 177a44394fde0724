//! DMS analysis results and alerts

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::EyeOpenness;

/// Drowsiness indicators raised for a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DmsAlert {
    /// Eyes closed for at least `frame_threshold` consecutive frames
    EyesClosed,

    /// Head tilted past `head_tilt_threshold_degrees`
    HeadTilted,
}

impl fmt::Display for DmsAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DmsAlert::EyesClosed => write!(f, "Eyes Closed"),
            DmsAlert::HeadTilted => write!(f, "Head Tilted"),
        }
    }
}

/// Geometry measured on the tracked face
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceMetrics {
    /// Eye aspect ratios
    pub eyes: EyeOpenness,

    /// Head tilt in degrees
    pub tilt_degrees: f32,

    /// Current low-EAR run length after this frame
    pub closed_frames: u32,
}

/// Complete DMS analysis result for one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DmsAnalysis {
    /// Number of faces the detector returned
    pub face_count: usize,

    /// Metrics of the tracked face. `None` when no face was usable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<FaceMetrics>,

    /// Active alerts, in `EyesClosed`, `HeadTilted` order
    pub alerts: Vec<DmsAlert>,
}

impl DmsAnalysis {
    /// Whether any face was detected
    pub fn face_detected(&self) -> bool {
        self.face_count > 0
    }

    /// Whether this frame carries a verdict either way
    pub fn is_assessed(&self) -> bool {
        self.metrics.is_some()
    }

    /// Check if any alerts are active
    pub fn has_alerts(&self) -> bool {
        !self.alerts.is_empty()
    }

    /// Human-readable reason, e.g. "Eyes Closed, Head Tilted"
    pub fn reason(&self) -> String {
        self.alerts
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
