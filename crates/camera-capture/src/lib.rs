//! Camera Capture Library for the Drowsiness Monitor
//!
//! Provides the frame types and the pull-based `FrameSource` contract used by
//! the detection loop. Supports:
//! - Decoded RGB frames with downscaling for analysis
//! - Replaying a directory of still images as a live source

pub mod frame;
pub mod replay;

pub use frame::VideoFrame;
pub use replay::ImageDirSource;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Camera error types
#[derive(Error, Debug)]
pub enum CameraError {
    #[error("Failed to open camera: {0}")]
    Open(String),

    #[error("Frame unavailable")]
    Unavailable,

    #[error("Failed to decode frame: {0}")]
    Decode(String),

    #[error("Capture timeout")]
    Timeout,

    #[error("Camera released")]
    Released,
}

impl CameraError {
    /// Whether the next call to `next_frame` may succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CameraError::Unavailable | CameraError::Decode(_) | CameraError::Timeout
        )
    }
}

/// Pull-based frame producer.
///
/// `next_frame` must return promptly: a source that has nothing to offer
/// reports `CameraError::Unavailable` instead of blocking indefinitely.
pub trait FrameSource: Send {
    /// Acquire the next frame
    fn next_frame(&mut self) -> Result<VideoFrame, CameraError>;

    /// Release the underlying device. Called once when the session stops.
    fn release(&mut self) {}
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> Result<VideoFrame, CameraError> {
        (**self).next_frame()
    }

    fn release(&mut self) {
        (**self).release()
    }
}

/// Camera configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Replay directory or device path (e.g., "./frames", "/dev/video0")
    pub device: String,
    /// Restart from the first image once a replay directory is exhausted
    pub looping: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device: "frames".to_string(),
            looping: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_errors() {
        assert!(CameraError::Unavailable.is_transient());
        assert!(CameraError::Timeout.is_transient());
        assert!(CameraError::Decode("bad jpeg".into()).is_transient());
        assert!(!CameraError::Open("/dev/video9".into()).is_transient());
        assert!(!CameraError::Released.is_transient());
    }

    #[test]
    fn test_default_device_is_replay_directory() {
        assert_eq!(CameraConfig::default().device, "frames");
    }
}
