//! Two-state sensors: door button (DS1) and PIR motion (DPIR1).
//!
//! Both report a boolean "active" level; the [`RisingEdge`] rule turns
//! that into one message per activation.
//!
//! [`RisingEdge`]: super::edge::RisingEdge

use embedded_hal::digital::InputPin;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::Pacing;
use crate::app::ports::ValueSource;
use crate::error::{HardwareError, Result};

/// Random-walk switch.  Each sample flips the previous state with
/// probability one half, after a paced delay.
pub struct SimulatedSwitch {
    state: bool,
    rng: StdRng,
    pacing: Pacing,
}

impl SimulatedSwitch {
    const FLIP_PROBABILITY: f64 = 0.5;

    pub fn new(pacing: Pacing) -> Self {
        Self::with_rng(StdRng::from_os_rng(), pacing)
    }

    /// Deterministic sequence for tests.
    pub fn seeded(seed: u64, pacing: Pacing) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), pacing)
    }

    fn with_rng(rng: StdRng, pacing: Pacing) -> Self {
        Self {
            state: false,
            rng,
            pacing,
        }
    }
}

impl ValueSource for SimulatedSwitch {
    type Reading = bool;

    fn sample(&mut self) -> Result<bool> {
        self.pacing.pause(&mut self.rng);
        if self.rng.random_bool(Self::FLIP_PROBABILITY) {
            self.state = !self.state;
        }
        Ok(self.state)
    }
}

/// A GPIO input read once per sample.
///
/// The door button is wired to ground with a pull-up, so it is
/// active-low.  The PIR module drives its output high on motion.
pub struct DigitalInput<P> {
    pin: P,
    gpio: u8,
    active_low: bool,
}

impl<P: InputPin> DigitalInput<P> {
    pub fn active_low(pin: P, gpio: u8) -> Self {
        Self {
            pin,
            gpio,
            active_low: true,
        }
    }

    pub fn active_high(pin: P, gpio: u8) -> Self {
        Self {
            pin,
            gpio,
            active_low: false,
        }
    }
}

impl<P: InputPin + Send> ValueSource for DigitalInput<P> {
    type Reading = bool;

    fn sample(&mut self) -> Result<bool> {
        let high = self
            .pin
            .is_high()
            .map_err(|e| HardwareError::read(self.gpio, &e))?;
        Ok(high != self.active_low)
    }
}
