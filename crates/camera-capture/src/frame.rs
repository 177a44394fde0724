//! Video frame types and processing

use image::imageops::{self, FilterType};
use image::RgbImage;
use tracing::warn;

/// Decoded RGB video frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    /// RGB pixel data (width * height * 3)
    pub data: Vec<u8>,
    /// Frame width
    pub width: u32,
    /// Frame height
    pub height: u32,
    /// Capture timestamp (nanoseconds)
    pub timestamp_ns: u64,
    /// Frame sequence number
    pub sequence: u32,
}

impl VideoFrame {
    /// Create a new video frame from raw RGB data
    pub fn new(data: Vec<u8>, width: u32, height: u32, timestamp_ns: u64, sequence: u32) -> Self {
        Self {
            data,
            width,
            height,
            timestamp_ns,
            sequence,
        }
    }

    /// Create a black frame of the given size
    pub fn blank(width: u32, height: u32, sequence: u32) -> Self {
        Self::new(vec![0; rgb_len(width, height)], width, height, 0, sequence)
    }

    /// Wrap a decoded RGB image
    pub fn from_rgb_image(img: RgbImage, timestamp_ns: u64, sequence: u32) -> Self {
        let (width, height) = img.dimensions();
        Self::new(img.into_raw(), width, height, timestamp_ns, sequence)
    }

    /// Copy the pixels into an `image` buffer
    pub fn to_rgb_image(&self) -> Option<RgbImage> {
        RgbImage::from_raw(self.width, self.height, self.data.clone())
    }

    /// Get pixel at (x, y)
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        self.data
            .get(idx..idx + 3)
            .map(|p| [p[0], p[1], p[2]])
    }

    /// Resize frame (nearest neighbour). Returns a clone if the size already matches.
    pub fn resize(&self, new_width: u32, new_height: u32) -> VideoFrame {
        if (new_width, new_height) == (self.width, self.height)
            || new_width == 0
            || new_height == 0
            || self.width == 0
            || self.height == 0
        {
            return self.clone();
        }

        match self.to_rgb_image() {
            Some(rgb) => {
                let resized = imageops::resize(&rgb, new_width, new_height, FilterType::Nearest);
                Self::from_rgb_image(resized, self.timestamp_ns, self.sequence)
            }
            None => {
                warn!(
                    "Frame #{} has {} bytes, expected {}; not resizing",
                    self.sequence,
                    self.data.len(),
                    rgb_len(self.width, self.height)
                );
                self.clone()
            }
        }
    }
}

/// Byte length of a packed RGB buffer
pub fn rgb_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 3
}
