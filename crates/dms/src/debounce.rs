//! Consecutive-frame debouncing of the eyes-closed signal
//!
//! A blink lasts a handful of frames; only a run of at least
//! `frame_threshold` low-EAR frames counts as closed eyes.

use crate::DmsConfig;

/// Low-EAR run counter
#[derive(Debug, Clone)]
pub struct DebounceCounter {
    consecutive_low: u32,
    frame_threshold: u32,
    ear_threshold: f32,
}

impl DebounceCounter {
    pub fn new(ear_threshold: f32, frame_threshold: u32) -> Self {
        Self {
            consecutive_low: 0,
            frame_threshold,
            ear_threshold,
        }
    }

    pub fn from_config(config: &DmsConfig) -> Self {
        Self::new(config.ear_threshold, config.frame_threshold)
    }

    /// Feed one EAR sample. Returns true while the eyes are stably closed.
    pub fn observe(&mut self, ear: f32) -> bool {
        if ear < self.ear_threshold {
            self.consecutive_low = self.consecutive_low.saturating_add(1);
        } else {
            self.consecutive_low = 0;
        }
        self.is_closed()
    }

    pub fn is_closed(&self) -> bool {
        self.consecutive_low >= self.frame_threshold
    }

    /// Length of the current low-EAR run
    pub fn count(&self) -> u32 {
        self.consecutive_low
    }

    pub fn reset(&mut self) {
        self.consecutive_low = 0;
    }
}

impl Default for DebounceCounter {
    fn default() -> Self {
        Self::from_config(&DmsConfig::default())
    }
}
