//! Sensor subsystem — value sources, edge rules, and the polling loop.
//!
//! Every configured sensor runs [`run_loop`] on its own thread:
//!
//! ```text
//!   ┌─────────────┐  reading  ┌──────────┐  message  ┌──────────┐
//!   │ ValueSource │─────────▶│ EdgeRule │─────────▶│ callback │
//!   └─────────────┘           └──────────┘           └──────────┘
//!          ▲
//!          └── repeat until StopSignal is set
//! ```
//!
//! | Device | Source (simulated / real)          | Rule         |
//! |--------|------------------------------------|--------------|
//! | DS1    | `SimulatedSwitch` / `DigitalInput`  | `RisingEdge` |
//! | DPIR1  | `SimulatedSwitch` / `DigitalInput`  | `RisingEdge` |
//! | DUS1   | `SimulatedRanger` / `EchoRanger`    | `Distance`   |
//! | DMS    | `SimulatedKeypad` / `MatrixKeypad`  | `KeyPress`   |

pub mod binary;
pub mod edge;
pub mod keypad;
pub mod ultrasonic;

use std::thread;
use std::time::Duration;

use log::debug;
use rand::Rng;

use crate::app::ports::ValueSource;
use crate::error::Result;
use crate::supervisor::StopSignal;
use edge::EdgeRule;

/// Random delay a simulated source waits before each sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pacing {
    min: Duration,
    max: Duration,
}

impl Pacing {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            min,
            max: max.max(min),
        }
    }

    /// Delay between `min_units` and `max_units` multiples of `unit`.
    pub fn units(unit: Duration, min_units: f64, max_units: f64) -> Self {
        Self::new(unit.mul_f64(min_units), unit.mul_f64(max_units))
    }

    /// No delay at all (tests).
    pub fn immediate() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    pub(crate) fn pause(&self, rng: &mut impl Rng) {
        if self.max.is_zero() {
            return;
        }
        let secs = rng.random_range(self.min.as_secs_f64()..=self.max.as_secs_f64());
        thread::sleep(Duration::from_secs_f64(secs));
    }
}

/// Poll `source` until `stop` is set, reporting what `rule` lets through.
///
/// `poll_interval` is the fixed sleep before each hardware sample;
/// simulated sources pace themselves and pass `None`.  The stop signal is
/// checked once per iteration, so shutdown latency is one delay.  A
/// sample taken after stop was requested is discarded.
///
/// A sampling error ends the loop and is returned to the caller; nothing
/// restarts it.
pub fn run_loop<S, R, F>(
    mut source: S,
    poll_interval: Option<Duration>,
    mut rule: R,
    mut callback: F,
    stop: &StopSignal,
) -> Result<()>
where
    S: ValueSource,
    R: EdgeRule<Reading = S::Reading>,
    F: FnMut(String),
{
    while !stop.is_set() {
        if let Some(interval) = poll_interval {
            thread::sleep(interval);
        }
        let reading = source.sample()?;
        if stop.is_set() {
            break;
        }
        if let Some(message) = rule.apply(reading) {
            callback(message);
        }
    }
    debug!("sensor loop observed stop signal");
    Ok(())
}
