//! Directory replay source
//!
//! Serves the still images of a directory, in file-name order, as if they came
//! from a camera. Useful for bench runs and for reproducing field recordings.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info};

use crate::{CameraConfig, CameraError, FrameSource, VideoFrame};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// Frame source backed by image files on disk
pub struct ImageDirSource {
    files: Vec<PathBuf>,
    position: usize,
    looping: bool,
    sequence: u32,
    released: bool,
}

impl ImageDirSource {
    /// Open a replay directory. Fails if it holds no readable images.
    pub fn open(config: &CameraConfig) -> Result<Self, CameraError> {
        let files = list_images(Path::new(&config.device))?;
        if files.is_empty() {
            return Err(CameraError::Open(format!(
                "no images found in {}",
                config.device
            )));
        }

        info!("Replaying {} frames from {}", files.len(), config.device);
        Ok(Self {
            files,
            position: 0,
            looping: config.looping,
            sequence: 0,
            released: false,
        })
    }

    /// Number of images in the replay set
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the replay set is empty
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FrameSource for ImageDirSource {
    fn next_frame(&mut self) -> Result<VideoFrame, CameraError> {
        if self.released {
            return Err(CameraError::Released);
        }
        if self.position >= self.files.len() {
            if !self.looping {
                return Err(CameraError::Unavailable);
            }
            self.position = 0;
        }

        let path = &self.files[self.position];
        self.position += 1;
        // Every file consumes a sequence number, decodable or not, so
        // sequence numbers keep tracking the replay position
        let sequence = self.sequence;
        self.sequence = self.sequence.wrapping_add(1);

        let img = image::open(path)
            .map_err(|e| CameraError::Decode(format!("{}: {}", path.display(), e)))?
            .to_rgb8();

        let timestamp_ns = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);

        Ok(VideoFrame::from_rgb_image(img, timestamp_ns, sequence))
    }

    fn release(&mut self) {
        debug!("Releasing replay source");
        self.released = true;
    }
}

fn list_images(dir: &Path) -> Result<Vec<PathBuf>, CameraError> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| CameraError::Open(format!("{}: {}", dir.display(), e)))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}
