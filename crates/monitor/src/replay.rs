//! Collaborators backed by recorded data

use std::path::PathBuf;

use camera_capture::{CameraConfig, CameraError, FrameSource, ImageDirSource};
use dms::{DmsError, LandmarkDetector, ScriptedDetector};

use crate::session::Collaborators;
use crate::MonitorConfig;

/// Image directory as the camera, JSON landmark script as the detector
#[derive(Debug, Clone)]
pub struct ReplayCollaborators {
    camera: CameraConfig,
    landmark_script: PathBuf,
}

impl ReplayCollaborators {
    pub fn new(camera: CameraConfig, landmark_script: PathBuf) -> Self {
        Self {
            camera,
            landmark_script,
        }
    }

    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(config.camera.clone(), config.landmark_script.clone())
    }
}

impl Collaborators for ReplayCollaborators {
    fn open_frame_source(&self) -> Result<Box<dyn FrameSource>, CameraError> {
        Ok(Box::new(ImageDirSource::open(&self.camera)?))
    }

    fn open_landmark_detector(&self) -> Result<Box<dyn LandmarkDetector>, DmsError> {
        Ok(Box::new(ScriptedDetector::from_path(&self.landmark_script)?))
    }
}
