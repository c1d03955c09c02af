//! Door buzzer (DB) driver.
//!
//! `activate` is synchronous: it returns only after the buzzer has
//! sounded for `duration_s` time units.  The dispatcher runs it on a
//! supervised job thread so the console stays responsive.
//!
//! ## Dual-mode design
//!
//! Simulated: logs the activation and sleeps.
//! Real: drives an active buzzer on a GPIO output high for the duration.
//! The pin has no PWM, so the frequency is only logged.

use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use embedded_hal::digital::OutputPin;
use log::info;

use crate::app::ports::BuzzerPort;
use crate::error::HardwareError;

fn status(frequency_hz: u32, duration_s: u32) -> String {
    format!("Buzzer activated: {frequency_hz}Hz for {duration_s}s")
}

pub struct SimulatedBuzzer {
    time_unit: Duration,
}

impl SimulatedBuzzer {
    /// `time_unit` is one "second" of buzzing.
    pub fn new(time_unit: Duration) -> Self {
        Self { time_unit }
    }
}

impl BuzzerPort for SimulatedBuzzer {
    fn activate(&self, frequency_hz: u32, duration_s: u32) -> Result<String, HardwareError> {
        let msg = status(frequency_hz, duration_s);
        info!("DB(sim): {}", msg);
        thread::sleep(self.time_unit * duration_s);
        info!("DB(sim): Buzzer stopped");
        Ok(msg)
    }

    fn is_simulated(&self) -> bool {
        true
    }
}

/// Active buzzer on a GPIO output.
///
/// The mutex serialises individual pin writes only.  It is never held
/// across the sleep, so overlapping activations still interleave freely.
pub struct GpioBuzzer<P> {
    pin: Mutex<P>,
    gpio: u8,
    time_unit: Duration,
}

impl<P: OutputPin> GpioBuzzer<P> {
    pub fn new(pin: P, gpio: u8, time_unit: Duration) -> Self {
        Self {
            pin: Mutex::new(pin),
            gpio,
            time_unit,
        }
    }

    fn drive(&self, high: bool) -> Result<(), HardwareError> {
        let mut pin = self.pin.lock().unwrap_or_else(PoisonError::into_inner);
        let res = if high { pin.set_high() } else { pin.set_low() };
        res.map_err(|e| HardwareError::write(self.gpio, &e))
    }
}

impl<P: OutputPin + Send> BuzzerPort for GpioBuzzer<P> {
    fn activate(&self, frequency_hz: u32, duration_s: u32) -> Result<String, HardwareError> {
        let msg = status(frequency_hz, duration_s);
        info!("DB: GPIO{} {}", self.gpio, msg);
        self.drive(true)?;
        thread::sleep(self.time_unit * duration_s);
        self.drive(false)?;
        info!("DB: GPIO{} Buzzer stopped", self.gpio);
        Ok(msg)
    }

    fn is_simulated(&self) -> bool {
        false
    }
}
