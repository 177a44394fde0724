//! Alert cooldown state machine

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Alert configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Suppression window after an alert is raised (seconds)
    pub cooldown_seconds: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            cooldown_seconds: 30,
        }
    }
}

impl AlertConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_seconds)
    }
}

/// Alert state. Remaining cooldown is always derived from `started_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertState {
    Idle,
    Cooling {
        started_at: Instant,
        duration: Duration,
    },
}

impl AlertState {
    pub fn is_cooling(&self) -> bool {
        matches!(self, AlertState::Cooling { .. })
    }

    /// Time left in the cooldown, clamped at zero. `None` while idle.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        match *self {
            AlertState::Idle => None,
            AlertState::Cooling {
                started_at,
                duration,
            } => Some(duration.saturating_sub(now.saturating_duration_since(started_at))),
        }
    }

    /// Whole seconds left for display: `duration - floor(elapsed)`, clamped at zero
    pub fn remaining_secs(&self, now: Instant) -> Option<u64> {
        match *self {
            AlertState::Idle => None,
            AlertState::Cooling {
                started_at,
                duration,
            } => Some(
                duration
                    .as_secs()
                    .saturating_sub(now.saturating_duration_since(started_at).as_secs()),
            ),
        }
    }
}

/// What the current frame says about the driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// No usable face; not evidence either way
    Unobserved,
    /// Face seen, no drowsiness indicator
    Clear,
    /// Face seen with at least one drowsiness indicator
    Drowsy { reason: String },
}

/// A freshly raised alert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertEvent {
    pub reason: String,
    pub raised_at: Instant,
    /// 1-based count of alerts raised by this machine
    pub sequence: u64,
}

/// Outcome of feeding one observation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertUpdate {
    /// Set only on the Idle -> Cooling edge
    pub raised: Option<AlertEvent>,
    /// Whether a cooldown ran out during this update
    pub expired: bool,
    /// State after the update
    pub state: AlertState,
    /// Whole seconds of cooldown left, `None` while idle
    pub cooldown_secs: Option<u64>,
}

/// Edge-triggered alert state machine with cooldown
#[derive(Debug, Clone)]
pub struct AlertStateMachine {
    cooldown: Duration,
    state: AlertState,
    raised_count: u64,
}

impl AlertStateMachine {
    pub fn new(config: &AlertConfig) -> Self {
        Self {
            cooldown: config.cooldown(),
            state: AlertState::Idle,
            raised_count: 0,
        }
    }

    pub fn state(&self) -> AlertState {
        self.state
    }

    /// Number of alerts raised so far
    pub fn raised_count(&self) -> u64 {
        self.raised_count
    }

    /// Advance the machine to `now` and apply an observation
    pub fn observe(&mut self, now: Instant, observation: &Observation) -> AlertUpdate {
        let expired = self.expire(now);

        let raised = match (&self.state, observation) {
            (AlertState::Idle, Observation::Drowsy { reason }) => {
                self.raised_count += 1;
                self.state = AlertState::Cooling {
                    started_at: now,
                    duration: self.cooldown,
                };
                info!(
                    "Drowsiness alert #{} raised: {}",
                    self.raised_count, reason
                );
                Some(AlertEvent {
                    reason: reason.clone(),
                    raised_at: now,
                    sequence: self.raised_count,
                })
            }
            (AlertState::Cooling { .. }, Observation::Drowsy { reason }) => {
                debug!("Alert suppressed: in cooldown period ({})", reason);
                None
            }
            _ => None,
        };

        AlertUpdate {
            raised,
            expired,
            state: self.state,
            cooldown_secs: self.state.remaining_secs(now),
        }
    }

    /// Return to idle
    pub fn reset(&mut self) {
        self.state = AlertState::Idle;
    }

    fn expire(&mut self, now: Instant) -> bool {
        if let AlertState::Cooling { .. } = self.state {
            if self.state.remaining(now) == Some(Duration::ZERO) {
                info!("Alert cooldown finished");
                self.state = AlertState::Idle;
                return true;
            }
        }
        false
    }
}

impl Default for AlertStateMachine {
    fn default() -> Self {
        Self::new(&AlertConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drowsy() -> Observation {
        Observation::Drowsy {
            reason: "Eyes Closed".to_string(),
        }
    }

    #[test]
    fn test_single_condition_raises_once() {
        let mut machine = AlertStateMachine::default();
        let t0 = Instant::now();

        let update = machine.observe(t0, &drowsy());
        let event = update.raised.expect("alert raised");
        assert_eq!(event.reason, "Eyes Closed");
        assert_eq!(event.sequence, 1);
        assert!(update.state.is_cooling());
        assert_eq!(update.cooldown_secs, Some(30));
    }

    #[test]
    fn test_cooldown_suppresses_repeats() {
        let mut machine = AlertStateMachine::default();
        let t0 = Instant::now();
        machine.observe(t0, &drowsy());

        // 20 fps for just under 30 simulated seconds
        for frame in 1..600 {
            let now = t0 + Duration::from_millis(frame * 50);
            let update = machine.observe(now, &drowsy());
            assert!(update.raised.is_none(), "frame {}", frame);
            assert!(update.state.is_cooling());
        }
        assert_eq!(machine.raised_count(), 1);
    }

    #[test]
    fn test_expiry_at_exactly_cooldown() {
        let mut machine = AlertStateMachine::default();
        let t0 = Instant::now();
        machine.observe(t0, &drowsy());

        let update = machine.observe(t0 + Duration::from_secs(30), &drowsy());
        assert!(update.expired);
        assert_eq!(update.raised.map(|e| e.sequence), Some(2));
        assert_eq!(machine.raised_count(), 2);
    }

    #[test]
    fn test_expiry_returns_to_idle() {
        let mut machine = AlertStateMachine::default();
        let t0 = Instant::now();
        machine.observe(t0, &drowsy());

        let before = machine.observe(t0 + Duration::from_millis(29_999), &Observation::Clear);
        assert!(!before.expired);
        assert_eq!(before.cooldown_secs, Some(1));

        let after = machine.observe(t0 + Duration::from_secs(30), &Observation::Clear);
        assert!(after.expired);
        assert_eq!(after.state, AlertState::Idle);
        assert_eq!(after.cooldown_secs, None);
    }

    #[test]
    fn test_remaining_is_monotonic_and_clamped() {
        let t0 = Instant::now();
        let state = AlertState::Cooling {
            started_at: t0,
            duration: Duration::from_secs(30),
        };

        let mut previous = state.remaining(t0).unwrap();
        assert_eq!(previous, Duration::from_secs(30));
        for ms in (0..=31_000).step_by(250) {
            let remaining = state.remaining(t0 + Duration::from_millis(ms)).unwrap();
            assert!(remaining <= previous);
            previous = remaining;
        }
        assert_eq!(state.remaining(t0 + Duration::from_secs(30)), Some(Duration::ZERO));
        assert_eq!(state.remaining(t0 + Duration::from_secs(45)), Some(Duration::ZERO));
        assert_eq!(state.remaining_secs(t0 + Duration::from_secs(45)), Some(0));
    }

    #[test]
    fn test_whole_seconds_countdown() {
        let t0 = Instant::now();
        let state = AlertState::Cooling {
            started_at: t0,
            duration: Duration::from_secs(30),
        };

        assert_eq!(state.remaining_secs(t0 + Duration::from_millis(999)), Some(30));
        assert_eq!(state.remaining_secs(t0 + Duration::from_millis(1_000)), Some(29));
        assert_eq!(state.remaining_secs(t0 + Duration::from_millis(29_500)), Some(1));
        assert_eq!(AlertState::Idle.remaining_secs(t0), None);
    }

    #[test]
    fn test_unobserved_frames_keep_state() {
        let mut machine = AlertStateMachine::default();
        let t0 = Instant::now();

        let idle = machine.observe(t0, &Observation::Unobserved);
        assert!(idle.raised.is_none());
        assert_eq!(idle.state, AlertState::Idle);

        machine.observe(t0, &drowsy());
        let cooling = machine.observe(t0 + Duration::from_secs(5), &Observation::Unobserved);
        assert_eq!(cooling.cooldown_secs, Some(25));
    }

    #[test]
    fn test_reset() {
        let mut machine = AlertStateMachine::new(&AlertConfig { cooldown_seconds: 5 });
        let t0 = Instant::now();
        machine.observe(t0, &drowsy());
        machine.reset();
        assert!(machine.observe(t0, &drowsy()).raised.is_some());
    }
}
