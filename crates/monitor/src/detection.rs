//! Per-frame detection loop
//!
//! frame -> landmarks -> geometry -> debounced verdict -> alert decision ->
//! published snapshots and alarm.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use alerting::{AlarmPlayer, AlertStateMachine, AlertUpdate, Observation, StatusMessage};
use camera_capture::FrameSource;
use dms::{DmsAnalysis, DmsModule, LandmarkDetector};
use tracing::{debug, info, warn};

use crate::snapshot::Publisher;
use crate::StopToken;

/// Result of one loop iteration
#[derive(Debug, Clone, PartialEq)]
pub enum Iteration {
    /// Frame or landmarks unavailable; nothing changed
    Skipped,
    /// Frame source failed in a way retrying may not fix; nothing changed
    SourceLost,
    Processed {
        analysis: DmsAnalysis,
        update: AlertUpdate,
    },
}

impl Iteration {
    pub fn raised_alert(&self) -> bool {
        matches!(self, Iteration::Processed { update, .. } if update.raised.is_some())
    }
}

/// Detection session state. Owned by exactly one thread.
pub struct DetectionLoop {
    source: Box<dyn FrameSource>,
    detector: Box<dyn LandmarkDetector>,
    dms: DmsModule,
    alerts: AlertStateMachine,
    alarm: Arc<dyn AlarmPlayer>,
    publisher: Arc<Publisher>,
    analysis_size: (u32, u32),
    interval: Duration,
    stop: StopToken,
    source_lost: bool,
}

impl DetectionLoop {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source: Box<dyn FrameSource>,
        detector: Box<dyn LandmarkDetector>,
        dms: DmsModule,
        alerts: AlertStateMachine,
        alarm: Arc<dyn AlarmPlayer>,
        publisher: Arc<Publisher>,
        analysis_size: (u32, u32),
        interval: Duration,
    ) -> Self {
        Self {
            source,
            detector,
            dms,
            alerts,
            alarm,
            publisher,
            analysis_size,
            interval,
            stop: StopToken::new(),
            source_lost: false,
        }
    }

    /// Run one iteration as of `now`
    pub fn step(&mut self, now: Instant) -> Iteration {
        let frame = match self.source.next_frame() {
            Ok(frame) => frame,
            Err(e) if e.is_transient() => {
                debug!("Frame unavailable, skipping iteration: {}", e);
                return Iteration::Skipped;
            }
            Err(e) => {
                if !self.source_lost {
                    warn!("Frame source failed, retrying: {}", e);
                    self.source_lost = true;
                }
                return Iteration::SourceLost;
            }
        };
        if self.source_lost {
            info!("Frame source recovered");
            self.source_lost = false;
        }
        let (width, height) = self.analysis_size;
        let frame = frame.resize(width, height);

        let faces = match self.detector.detect(&frame) {
            Ok(faces) => faces,
            Err(e) => {
                debug!("Landmark detection failed, skipping iteration: {}", e);
                return Iteration::Skipped;
            }
        };

        let analysis = self.dms.analyze(&faces);
        let observation = if !analysis.is_assessed() {
            Observation::Unobserved
        } else if analysis.has_alerts() {
            Observation::Drowsy {
                reason: analysis.reason(),
            }
        } else {
            Observation::Clear
        };

        let update = self.alerts.observe(now, &observation);

        // A stop that timed out may already have silenced the alarm and
        // reset the display; a late iteration must not undo that
        if self.stop.is_cancelled() {
            return Iteration::Skipped;
        }

        if let Some(event) = &update.raised {
            self.publisher.publish_status(StatusMessage::drowsy(&event.reason));
            if let Err(e) = self.alarm.trigger() {
                warn!("Failed to play alarm: {}", e);
            }
        } else if observation == Observation::Clear && !update.state.is_cooling() {
            self.publisher.publish_status(StatusMessage::active());
        }

        self.publisher
            .publish_cooldown(update.cooldown_secs.filter(|secs| *secs > 0));
        self.publisher.publish_frame(frame);

        Iteration::Processed { analysis, update }
    }

    /// Iterate until `stop` is cancelled, pacing to the configured interval.
    /// Hands the frame source back so the caller can release it.
    pub fn run(mut self, stop: StopToken) -> Box<dyn FrameSource> {
        self.stop = stop;
        info!("Detection loop started ({:?} per iteration)", self.interval);
        let mut iterations: u64 = 0;

        while !self.stop.is_cancelled() {
            let started = Instant::now();
            self.step(started);
            iterations += 1;

            if let Some(rest) = self.interval.checked_sub(started.elapsed()) {
                thread::sleep(rest);
            }
        }

        info!(
            "Detection loop stopped after {} iterations, {} alerts",
            iterations,
            self.alerts.raised_count()
        );
        self.source
    }
}
