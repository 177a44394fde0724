//! Alerting System
//!
//! Provides the edge-triggered alert state machine with cooldown, status
//! severity mapping, and alarm playback.

mod alarm;
mod machine;
mod status;

pub use alarm::{AlarmConfig, AlarmError, AlarmPlayer, CommandAlarm, SilentAlarm};
pub use machine::{AlertConfig, AlertEvent, AlertState, AlertStateMachine, AlertUpdate, Observation};
pub use status::{Severity, StatusMessage};
