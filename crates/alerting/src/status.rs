//! Status text and severity shown to the driver

use serde::{Deserialize, Serialize};

/// Status severity, mapped to a display colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    /// Lifecycle information
    Info,
    /// Driver confirmed alert
    Normal,
    /// Drowsiness detected
    Critical,
}

impl Severity {
    pub fn color(&self) -> &'static str {
        match self {
            Severity::Info => "white",
            Severity::Normal => "green",
            Severity::Critical => "red",
        }
    }
}

/// Status line for the display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub text: String,
    pub severity: Severity,
}

impl StatusMessage {
    pub fn new(text: impl Into<String>, severity: Severity) -> Self {
        Self {
            text: text.into(),
            severity,
        }
    }

    pub fn not_started() -> Self {
        Self::new("Not Started", Severity::Info)
    }

    pub fn running() -> Self {
        Self::new("Running", Severity::Info)
    }

    pub fn stopped() -> Self {
        Self::new("Stopped", Severity::Info)
    }

    pub fn active() -> Self {
        Self::new("Active", Severity::Normal)
    }

    pub fn drowsy(reason: &str) -> Self {
        Self::new(format!("Drowsy Detected ({})", reason), Severity::Critical)
    }

    pub fn is_drowsy(&self) -> bool {
        self.severity == Severity::Critical
    }
}
