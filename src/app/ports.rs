//! Port traits — the boundary between the controller core and devices.
//!
//! ```text
//!   ValueSource ──▶ sensor loop ──▶ EventSink
//!   Dispatcher ──▶ LightPort / BuzzerPort ──▶ pin or simulation
//! ```
//!
//! Simulated and hardware-backed devices implement the same traits, so
//! the dispatcher and the sensor loop never know which one they drive.

use crate::error::{HardwareError, Result};

use super::events::SensorEvent;

// ───────────────────────────────────────────────────────────────
// Sensor side (device → core)
// ───────────────────────────────────────────────────────────────

/// Produces one raw reading per call.
///
/// Simulated sources block internally for their own randomised delay;
/// hardware sources take one sample immediately and rely on the loop's
/// poll interval for pacing.
pub trait ValueSource: Send {
    type Reading;

    fn sample(&mut self) -> Result<Self::Reading>;
}

/// Receives formatted sensor events from every loop.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &SensorEvent);
}

// ───────────────────────────────────────────────────────────────
// Actuator side (core → device)
// ───────────────────────────────────────────────────────────────

/// Door light binding.
pub trait LightPort: Send {
    /// Drive the light and echo the commanded value back.
    fn set_state(&mut self, on: bool) -> core::result::Result<bool, HardwareError>;

    /// Current light state (simulated cell or output latch).
    fn get_state(&mut self) -> core::result::Result<bool, HardwareError>;

    fn is_simulated(&self) -> bool;
}

/// Door buzzer binding.
///
/// `activate` blocks for the full duration; callers that must not block
/// run it on a supervised job thread.  Overlapping activations are
/// allowed.
pub trait BuzzerPort: Send + Sync {
    fn activate(
        &self,
        frequency_hz: u32,
        duration_s: u32,
    ) -> core::result::Result<String, HardwareError>;

    fn is_simulated(&self) -> bool;
}
