//! Landmark detection contract and the scripted replay detector

use std::path::Path;

use camera_capture::frame::VideoFrame;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::landmarks::LandmarkSet;
use crate::DmsError;

/// Maps a frame to zero or more facial landmark sets.
///
/// Face order carries no identity across calls.
pub trait LandmarkDetector: Send {
    fn detect(&mut self, frame: &VideoFrame) -> Result<Vec<LandmarkSet>, DmsError>;
}

impl<D: LandmarkDetector + ?Sized> LandmarkDetector for Box<D> {
    fn detect(&mut self, frame: &VideoFrame) -> Result<Vec<LandmarkSet>, DmsError> {
        (**self).detect(frame)
    }
}

/// Pre-recorded landmark sets, one entry per frame
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LandmarkScript {
    pub frames: Vec<Vec<LandmarkSet>>,
}

/// Detector that replays a `LandmarkScript`, keyed by frame sequence number
pub struct ScriptedDetector {
    script: LandmarkScript,
}

impl ScriptedDetector {
    pub fn new(script: LandmarkScript) -> Self {
        Self { script }
    }

    /// Load a script from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DmsError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| DmsError::ModelLoad(format!("{}: {}", path.display(), e)))?;
        let script = Self::parse(&raw)?;
        info!(
            "Loaded landmark script with {} frames from {}",
            script.script.frames.len(),
            path.display()
        );
        Ok(script)
    }

    /// Parse a script from JSON text
    pub fn parse(raw: &str) -> Result<Self, DmsError> {
        let script: LandmarkScript =
            serde_json::from_str(raw).map_err(|e| DmsError::ModelLoad(e.to_string()))?;
        if script.frames.is_empty() {
            return Err(DmsError::ModelLoad("landmark script has no frames".into()));
        }
        Ok(Self::new(script))
    }
}

impl LandmarkDetector for ScriptedDetector {
    fn detect(&mut self, frame: &VideoFrame) -> Result<Vec<LandmarkSet>, DmsError> {
        if self.script.frames.is_empty() {
            return Err(DmsError::Inference("empty landmark script".into()));
        }
        let index = frame.sequence as usize % self.script.frames.len();
        Ok(self.script.frames[index].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replays_by_sequence() {
        let script = LandmarkScript {
            frames: vec![
                vec![LandmarkSet::synthetic(0.3, 0.0)],
                vec![],
            ],
        };
        let mut detector = ScriptedDetector::new(script);

        assert_eq!(detector.detect(&VideoFrame::blank(4, 4, 0)).unwrap().len(), 1);
        assert!(detector.detect(&VideoFrame::blank(4, 4, 1)).unwrap().is_empty());
        assert_eq!(detector.detect(&VideoFrame::blank(4, 4, 2)).unwrap().len(), 1);
    }

    #[test]
    fn test_parse_rejects_empty_script() {
        assert!(matches!(
            ScriptedDetector::parse(r#"{"frames": []}"#),
            Err(DmsError::ModelLoad(_))
        ));
        assert!(ScriptedDetector::parse("not json").is_err());
    }

    #[test]
    fn test_parse_point_lists() {
        let detector =
            ScriptedDetector::parse(r#"{"frames": [[[{"x": 1.0, "y": 2.0}]]]}"#).unwrap();
        assert_eq!(detector.script.frames[0][0].len(), 1);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("landmarks.json");
        let script = LandmarkScript {
            frames: vec![vec![LandmarkSet::synthetic(0.1, 0.0)]],
        };
        std::fs::write(&path, serde_json::to_string(&script).unwrap()).unwrap();

        let mut detector = ScriptedDetector::from_path(&path).unwrap();
        assert_eq!(detector.detect(&VideoFrame::blank(2, 2, 5)).unwrap().len(), 1);
        assert!(ScriptedDetector::from_path(dir.path().join("missing.json")).is_err());
    }
}
