//! Display output and its refresh timer

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use alerting::Severity;
use camera_capture::VideoFrame;
use tracing::{debug, info, trace, warn};

use crate::snapshot::Snapshots;
use crate::StopToken;

/// Window / label rendering. Calls are fire-and-forget.
pub trait DisplaySink: Send + Sync {
    fn show_frame(&self, frame: &VideoFrame);

    fn show_status(&self, text: &str, severity: Severity);

    /// Remaining cooldown in whole seconds; `None` clears the label
    fn show_cooldown(&self, remaining_secs: Option<u64>);

    fn clear_frame(&self) {}
}

/// Display that writes status changes to the log
#[derive(Debug, Default)]
pub struct LogDisplay;

impl DisplaySink for LogDisplay {
    fn show_frame(&self, frame: &VideoFrame) {
        trace!("Frame #{} ({}x{})", frame.sequence, frame.width, frame.height);
    }

    fn show_status(&self, text: &str, severity: Severity) {
        match severity {
            Severity::Critical => warn!("Status: {}", text),
            _ => info!("Status: {} [{}]", text, severity.color()),
        }
    }

    fn show_cooldown(&self, remaining_secs: Option<u64>) {
        match remaining_secs {
            Some(secs) if secs > 0 => debug!("Cooldown: {} sec", secs),
            _ => debug!("Cooldown cleared"),
        }
    }
}

/// Pushes the newest snapshots to a `DisplaySink` on a fixed timer
pub struct DisplayRefresher {
    stop: StopToken,
    handle: Option<JoinHandle<()>>,
}

impl DisplayRefresher {
    pub fn spawn(
        snapshots: Snapshots,
        sink: Arc<dyn DisplaySink>,
        period: Duration,
    ) -> std::io::Result<Self> {
        let stop = StopToken::new();
        let token = stop.clone();
        let handle = thread::Builder::new()
            .name("display-refresh".into())
            .spawn(move || refresh_loop(snapshots, sink, period, token))?;
        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    pub fn shutdown(&mut self) {
        self.stop.cancel();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Display refresh thread panicked");
            }
        }
    }
}

impl Drop for DisplayRefresher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn refresh_loop(mut snapshots: Snapshots, sink: Arc<dyn DisplaySink>, period: Duration, stop: StopToken) {
    debug!("Display refresh every {:?}", period);
    while !stop.is_cancelled() {
        let tick = Instant::now();
        if !refresh_once(&mut snapshots, sink.as_ref()) {
            debug!("Snapshot publisher dropped; display refresh ending");
            break;
        }
        if let Some(rest) = period.checked_sub(tick.elapsed()) {
            thread::sleep(rest);
        }
    }
}

/// Forward every channel that changed since the last refresh.
/// Returns false once the publisher is gone.
pub(crate) fn refresh_once(snapshots: &mut Snapshots, sink: &dyn DisplaySink) -> bool {
    match snapshots.status.has_changed() {
        Ok(true) => {
            let status = snapshots.status.borrow_and_update().clone();
            sink.show_status(&status.text, status.severity);
        }
        Ok(false) => {}
        Err(_) => return false,
    }

    if let Ok(true) = snapshots.cooldown.has_changed() {
        let remaining = *snapshots.cooldown.borrow_and_update();
        sink.show_cooldown(remaining);
    }

    if let Ok(true) = snapshots.frame.has_changed() {
        let frame = snapshots.frame.borrow_and_update().clone();
        match frame {
            Some(frame) => sink.show_frame(&frame),
            None => sink.clear_frame(),
        }
    }

    true
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::snapshot;
    use alerting::StatusMessage;
    use std::sync::Mutex;

    /// Display that records everything it is shown
    #[derive(Default)]
    pub(crate) struct RecordingDisplay {
        pub statuses: Mutex<Vec<(String, Severity)>>,
        pub cooldowns: Mutex<Vec<Option<u64>>>,
        pub frames: Mutex<Vec<u32>>,
        pub clears: Mutex<usize>,
    }

    impl RecordingDisplay {
        pub fn status_texts(&self) -> Vec<String> {
            self.statuses.lock().unwrap().iter().map(|(t, _)| t.clone()).collect()
        }
    }

    impl DisplaySink for RecordingDisplay {
        fn show_frame(&self, frame: &VideoFrame) {
            self.frames.lock().unwrap().push(frame.sequence);
        }

        fn show_status(&self, text: &str, severity: Severity) {
            self.statuses.lock().unwrap().push((text.to_string(), severity));
        }

        fn show_cooldown(&self, remaining_secs: Option<u64>) {
            self.cooldowns.lock().unwrap().push(remaining_secs);
        }

        fn clear_frame(&self) {
            *self.clears.lock().unwrap() += 1;
        }
    }

    #[test]
    fn test_refresh_forwards_only_changes() {
        let (publisher, mut snapshots) = snapshot::channel();
        let display = RecordingDisplay::default();

        // Initial "Not Started" counts as seen
        assert!(refresh_once(&mut snapshots, &display));
        assert!(display.statuses.lock().unwrap().is_empty());

        publisher.publish_status(StatusMessage::active());
        publisher.publish_cooldown(Some(12));
        for seq in 0..3 {
            publisher.publish_frame(VideoFrame::blank(2, 2, seq));
        }
        assert!(refresh_once(&mut snapshots, &display));
        assert!(refresh_once(&mut snapshots, &display));

        assert_eq!(display.status_texts(), vec!["Active".to_string()]);
        assert_eq!(*display.cooldowns.lock().unwrap(), vec![Some(12)]);
        // Intermediate frames are dropped
        assert_eq!(*display.frames.lock().unwrap(), vec![2]);

        publisher.clear_frame();
        refresh_once(&mut snapshots, &display);
        assert_eq!(*display.clears.lock().unwrap(), 1);
    }

    #[test]
    fn test_refresh_stops_when_publisher_dropped() {
        let (publisher, mut snapshots) = snapshot::channel();
        drop(publisher);
        assert!(!refresh_once(&mut snapshots, &RecordingDisplay::default()));
    }

    #[test]
    fn test_refresher_thread_delivers_status() {
        let (publisher, snapshots) = snapshot::channel();
        let display = Arc::new(RecordingDisplay::default());
        let mut refresher =
            DisplayRefresher::spawn(snapshots, display.clone(), Duration::from_millis(5)).unwrap();

        publisher.publish_status(StatusMessage::running());
        let deadline = Instant::now() + Duration::from_secs(2);
        while display.status_texts().is_empty() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        refresher.shutdown();

        assert_eq!(display.status_texts(), vec!["Running".to_string()]);
    }
}
