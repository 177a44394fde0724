//! Latest-value handoff from the detection loop to the display
//!
//! One single-slot channel per concern (frame, status, cooldown). Writers
//! overwrite, readers see only the newest value; nothing ever queues.

use std::sync::Arc;

use alerting::StatusMessage;
use camera_capture::VideoFrame;
use tokio::sync::watch;

/// Write side, owned by the monitor and lent to the detection loop
pub struct Publisher {
    frame: watch::Sender<Option<Arc<VideoFrame>>>,
    status: watch::Sender<StatusMessage>,
    cooldown: watch::Sender<Option<u64>>,
}

/// Read side. Cheap to clone; every clone tracks its own "seen" markers.
#[derive(Clone)]
pub struct Snapshots {
    pub(crate) frame: watch::Receiver<Option<Arc<VideoFrame>>>,
    pub(crate) status: watch::Receiver<StatusMessage>,
    pub(crate) cooldown: watch::Receiver<Option<u64>>,
}

/// Create a connected publisher / reader pair
pub fn channel() -> (Publisher, Snapshots) {
    let (frame_tx, frame_rx) = watch::channel(None);
    let (status_tx, status_rx) = watch::channel(StatusMessage::not_started());
    let (cooldown_tx, cooldown_rx) = watch::channel(None);
    (
        Publisher {
            frame: frame_tx,
            status: status_tx,
            cooldown: cooldown_tx,
        },
        Snapshots {
            frame: frame_rx,
            status: status_rx,
            cooldown: cooldown_rx,
        },
    )
}

impl Publisher {
    pub fn publish_frame(&self, frame: VideoFrame) {
        self.frame.send_replace(Some(Arc::new(frame)));
    }

    pub fn clear_frame(&self) {
        self.frame.send_replace(None);
    }

    /// Replace the status; readers are only notified when it differs
    pub fn publish_status(&self, status: StatusMessage) {
        self.status.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                *current = status;
                true
            }
        });
    }

    /// Replace the remaining cooldown in whole seconds, `None` to clear it
    pub fn publish_cooldown(&self, remaining_secs: Option<u64>) {
        self.cooldown.send_if_modified(|current| {
            if *current == remaining_secs {
                false
            } else {
                *current = remaining_secs;
                true
            }
        });
    }
}

impl Snapshots {
    pub fn latest_frame(&self) -> Option<Arc<VideoFrame>> {
        self.frame.borrow().clone()
    }

    pub fn latest_status(&self) -> StatusMessage {
        self.status.borrow().clone()
    }

    pub fn latest_cooldown(&self) -> Option<u64> {
        *self.cooldown.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alerting::Severity;

    #[test]
    fn test_initial_values() {
        let (_publisher, snapshots) = channel();
        assert!(snapshots.latest_frame().is_none());
        assert_eq!(snapshots.latest_status(), StatusMessage::not_started());
        assert_eq!(snapshots.latest_cooldown(), None);
    }

    #[test]
    fn test_last_write_wins() {
        let (publisher, snapshots) = channel();
        for seq in 0..5 {
            publisher.publish_frame(VideoFrame::blank(2, 2, seq));
        }
        publisher.publish_cooldown(Some(30));
        publisher.publish_cooldown(Some(29));

        assert_eq!(snapshots.latest_frame().unwrap().sequence, 4);
        assert_eq!(snapshots.latest_cooldown(), Some(29));

        publisher.clear_frame();
        assert!(snapshots.latest_frame().is_none());
    }

    #[test]
    fn test_identical_status_does_not_notify() {
        let (publisher, mut snapshots) = channel();
        publisher.publish_status(StatusMessage::active());
        assert!(snapshots.status.has_changed().unwrap());
        snapshots.status.borrow_and_update();

        publisher.publish_status(StatusMessage::active());
        assert!(!snapshots.status.has_changed().unwrap());

        publisher.publish_status(StatusMessage::new("Drowsy Detected (Eyes Closed)", Severity::Critical));
        assert!(snapshots.status.has_changed().unwrap());
    }
}
