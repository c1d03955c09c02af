//! Door ultrasonic distance sensor (DUS1).
//!
//! ## Dual-mode design
//!
//! Simulated: a uniform integer distance in 1..=50 cm per sample.
//! Real: an HC-SR04 style ranger.  A 10 µs pulse on the trigger pin starts
//! a measurement; the echo pin then stays high for the round-trip time.
//!
//! ```text
//!  trigger  ──┐‾‾‾‾┌──────────────────────────
//!  echo     ─────────────┌‾‾‾‾‾‾‾‾‾‾‾‾┐───────
//!                        │◀── t µs ──▶│       distance = t / 58 cm
//! ```
//!
//! No echo (or an echo that never ends) within [`ECHO_TIMEOUT`] yields
//! `None` for that sample.

use std::hint;
use std::thread;
use std::time::{Duration, Instant};

use embedded_hal::digital::{InputPin, OutputPin};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::Pacing;
use crate::app::ports::ValueSource;
use crate::error::{HardwareError, Result};

/// Longest wait for each echo edge.  Covers the sensor's ~4 m range.
pub const ECHO_TIMEOUT: Duration = Duration::from_millis(30);
const TRIGGER_PULSE: Duration = Duration::from_micros(10);
/// Round-trip microseconds per centimetre.
const US_PER_CM: u128 = 58;

pub const SIM_MIN_CM: u32 = 1;
pub const SIM_MAX_CM: u32 = 50;

// ── Simulated ─────────────────────────────────────────────────

pub struct SimulatedRanger {
    rng: StdRng,
    pacing: Pacing,
}

impl SimulatedRanger {
    pub fn new(pacing: Pacing) -> Self {
        Self {
            rng: StdRng::from_os_rng(),
            pacing,
        }
    }

    pub fn seeded(seed: u64, pacing: Pacing) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            pacing,
        }
    }
}

impl ValueSource for SimulatedRanger {
    type Reading = Option<u32>;

    fn sample(&mut self) -> Result<Option<u32>> {
        self.pacing.pause(&mut self.rng);
        Ok(Some(self.rng.random_range(SIM_MIN_CM..=SIM_MAX_CM)))
    }
}

// ── Hardware ──────────────────────────────────────────────────

pub struct EchoRanger<T, E> {
    trigger: T,
    echo: E,
    trigger_gpio: u8,
    echo_gpio: u8,
}

impl<T: OutputPin, E: InputPin> EchoRanger<T, E> {
    pub fn new(trigger: T, trigger_gpio: u8, echo: E, echo_gpio: u8) -> Self {
        Self {
            trigger,
            echo,
            trigger_gpio,
            echo_gpio,
        }
    }

    fn pulse_trigger(&mut self) -> Result<()> {
        let gpio = self.trigger_gpio;
        self.trigger
            .set_high()
            .map_err(|e| HardwareError::write(gpio, &e))?;
        thread::sleep(TRIGGER_PULSE);
        self.trigger
            .set_low()
            .map_err(|e| HardwareError::write(gpio, &e))?;
        Ok(())
    }

    /// Spin until the echo pin reads `level` or `deadline` passes.
    /// Returns whether the level was reached.
    fn wait_for(&mut self, level: bool, deadline: Instant) -> Result<bool> {
        loop {
            let high = self
                .echo
                .is_high()
                .map_err(|e| HardwareError::read(self.echo_gpio, &e))?;
            if high == level {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            hint::spin_loop();
        }
    }

    /// One measurement in whole centimetres, or `None` on timeout.
    pub fn measure(&mut self) -> Result<Option<u32>> {
        self.pulse_trigger()?;

        if !self.wait_for(true, Instant::now() + ECHO_TIMEOUT)? {
            debug!("DUS1: no echo");
            return Ok(None);
        }
        let rise = Instant::now();
        if !self.wait_for(false, rise + ECHO_TIMEOUT)? {
            debug!("DUS1: echo did not end");
            return Ok(None);
        }

        let cm = rise.elapsed().as_micros() / US_PER_CM;
        debug!("DUS1: {} cm", cm);
        Ok(Some(u32::try_from(cm).unwrap_or(u32::MAX)))
    }
}

impl<T, E> ValueSource for EchoRanger<T, E>
where
    T: OutputPin + Send,
    E: InputPin + Send,
{
    type Reading = Option<u32>;

    fn sample(&mut self) -> Result<Option<u32>> {
        self.measure()
    }
}
