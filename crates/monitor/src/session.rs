//! Detection session lifecycle
//!
//! A session lives from `start` to `stop`. It owns the frame source, the
//! detector, and fresh debounce/alert state; nothing carries over to the next
//! session.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use alerting::{AlarmPlayer, AlertStateMachine, StatusMessage};
use camera_capture::{CameraError, FrameSource};
use dms::{DmsError, DmsModule, LandmarkDetector};
use tracing::{debug, error, info, warn};

use crate::detection::DetectionLoop;
use crate::display::{DisplayRefresher, DisplaySink};
use crate::snapshot::{self, Publisher, Snapshots};
use crate::{MonitorConfig, MonitorError, StopToken};

const JOIN_POLL: Duration = Duration::from_millis(5);

/// Opens the per-session resources
pub trait Collaborators: Send + Sync {
    fn open_frame_source(&self) -> Result<Box<dyn FrameSource>, CameraError>;

    fn open_landmark_detector(&self) -> Result<Box<dyn LandmarkDetector>, DmsError>;
}

type LoopHandle = JoinHandle<Box<dyn FrameSource>>;

struct Session {
    id: u64,
    stop: StopToken,
    handle: LoopHandle,
    started_at: Instant,
}

/// Starts and stops detection sessions and keeps the display fed
pub struct Monitor {
    config: MonitorConfig,
    collaborators: Arc<dyn Collaborators>,
    alarm: Arc<dyn AlarmPlayer>,
    publisher: Arc<Publisher>,
    snapshots: Snapshots,
    refresher: DisplayRefresher,
    session: Option<Session>,
    /// Loop thread that outlived its stop timeout; joined before the next start
    lingering: Option<LoopHandle>,
    sessions_started: u64,
}

impl Monitor {
    pub fn new(
        config: MonitorConfig,
        collaborators: Arc<dyn Collaborators>,
        alarm: Arc<dyn AlarmPlayer>,
        display: Arc<dyn DisplaySink>,
    ) -> Result<Self, MonitorError> {
        config.validate()?;
        let (publisher, snapshots) = snapshot::channel();
        let refresher =
            DisplayRefresher::spawn(snapshots.clone(), display, config.detection.display_refresh())?;

        Ok(Self {
            config,
            collaborators,
            alarm,
            publisher: Arc::new(publisher),
            snapshots,
            refresher,
            session: None,
            lingering: None,
            sessions_started: 0,
        })
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    /// Reader for the latest frame, status, and cooldown
    pub fn snapshots(&self) -> Snapshots {
        self.snapshots.clone()
    }

    /// Start a new session.
    ///
    /// Returns `Ok(false)` if one is already running. On error nothing is
    /// left running.
    pub fn start(&mut self) -> Result<bool, MonitorError> {
        if self.session.is_some() {
            debug!("Start requested while detection is running; ignoring");
            return Ok(false);
        }
        self.reap_lingering();

        let mut source = self
            .collaborators
            .open_frame_source()
            .map_err(MonitorError::SourceInit)?;

        let prepared = self
            .collaborators
            .open_landmark_detector()
            .map_err(MonitorError::DetectorInit)
            .and_then(|detector| {
                let dms = DmsModule::new(self.config.dms.clone())
                    .map_err(|e| MonitorError::Config(e.to_string()))?;
                Ok((detector, dms))
            });
        let (detector, dms) = match prepared {
            Ok(prepared) => prepared,
            Err(e) => {
                source.release();
                return Err(e);
            }
        };

        let detection = DetectionLoop::new(
            source,
            detector,
            dms,
            AlertStateMachine::new(&self.config.alert),
            self.alarm.clone(),
            self.publisher.clone(),
            (
                self.config.detection.analysis_width,
                self.config.detection.analysis_height,
            ),
            self.config.detection.iteration_interval(),
        );

        self.publisher.publish_cooldown(None);
        self.publisher.publish_status(StatusMessage::running());

        let stop = StopToken::new();
        let token = stop.clone();
        let handle = match thread::Builder::new()
            .name("detection-loop".into())
            .spawn(move || detection.run(token))
        {
            Ok(handle) => handle,
            Err(e) => {
                self.publisher.publish_status(StatusMessage::stopped());
                return Err(MonitorError::Spawn(e));
            }
        };

        self.sessions_started += 1;
        self.session = Some(Session {
            id: self.sessions_started,
            stop,
            handle,
            started_at: Instant::now(),
        });
        info!("Detection session #{} started", self.sessions_started);
        Ok(true)
    }

    /// Stop the running session.
    ///
    /// Waits at most `stop_timeout` for the current iteration, then releases
    /// the frame source and silences the alarm. Returns `Ok(false)` if no
    /// session was running.
    pub fn stop(&mut self) -> Result<bool, MonitorError> {
        let Some(session) = self.session.take() else {
            debug!("Stop requested while detection is stopped; ignoring");
            return Ok(false);
        };

        session.stop.cancel();
        let timeout = self.config.detection.stop_timeout();
        let deadline = Instant::now() + timeout;
        while !session.handle.is_finished() && Instant::now() < deadline {
            thread::sleep(JOIN_POLL);
        }

        if session.handle.is_finished() {
            join_and_release(session.handle);
        } else {
            warn!(
                "Detection session #{} did not stop within {:?}; finishing teardown before next start",
                session.id, timeout
            );
            self.lingering = Some(session.handle);
        }

        self.alarm.silence();
        self.publisher.publish_cooldown(None);
        self.publisher.clear_frame();
        self.publisher.publish_status(StatusMessage::stopped());
        info!(
            "Detection session #{} stopped after {:?}",
            session.id,
            session.started_at.elapsed()
        );
        Ok(true)
    }

    /// Start if stopped, stop if running. Returns whether a session is now running.
    pub fn toggle(&mut self) -> Result<bool, MonitorError> {
        if self.is_running() {
            self.stop()?;
            Ok(false)
        } else {
            self.start()?;
            Ok(true)
        }
    }

    fn reap_lingering(&mut self) {
        if let Some(handle) = self.lingering.take() {
            info!("Waiting for previous detection loop to exit");
            join_and_release(handle);
        }
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            error!("Failed to stop detection on shutdown: {}", e);
        }
        self.reap_lingering();
        self.refresher.shutdown();
    }
}

fn join_and_release(handle: LoopHandle) {
    match handle.join() {
        Ok(mut source) => {
            source.release();
            debug!("Frame source released");
        }
        Err(_) => error!("Detection loop panicked; frame source dropped"),
    }
}
