//! Sensor events.
//!
//! Built by a sensor loop's callback and handed straight to the
//! [`EventSink`](super::ports::EventSink).  Nothing is persisted.

use core::fmt;

use chrono::{DateTime, Local};

use crate::config::DeviceId;

/// Separator printed above every event on the console.
const RULE: &str = "====================";

#[derive(Debug, Clone)]
pub struct SensorEvent {
    pub source: DeviceId,
    pub message: String,
    pub timestamp: DateTime<Local>,
}

impl SensorEvent {
    /// Stamp `message` with the current wall-clock time.
    pub fn now(source: DeviceId, message: impl Into<String>) -> Self {
        Self {
            source,
            message: message.into(),
            timestamp: Local::now(),
        }
    }
}

impl fmt::Display for SensorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{RULE}")?;
        writeln!(f, "Timestamp: {}", self.timestamp.format("%H:%M:%S"))?;
        write!(f, "[{}] {}", self.source, self.message)
    }
}
