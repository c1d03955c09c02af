//! Door light (DL) driver.
//!
//! ## Dual-mode design
//!
//! Simulated: the state lives in a [`LightState`] cell injected at
//! construction, so two simulated lights never share hidden state.
//! Real: a GPIO output; the pin's output latch is the source of truth and
//! there is no software mirror.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::digital::StatefulOutputPin;
use log::info;

use crate::app::ports::LightPort;
use crate::error::HardwareError;

/// Shareable on/off cell backing a simulated light.
#[derive(Debug, Clone, Default)]
pub struct LightState(Arc<AtomicBool>);

impl LightState {
    pub fn new(on: bool) -> Self {
        Self(Arc::new(AtomicBool::new(on)))
    }

    pub fn get(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn set(&self, on: bool) {
        self.0.store(on, Ordering::Release);
    }
}

pub struct SimulatedLight {
    state: LightState,
}

impl SimulatedLight {
    pub fn new(state: LightState) -> Self {
        Self { state }
    }
}

impl LightPort for SimulatedLight {
    fn set_state(&mut self, on: bool) -> Result<bool, HardwareError> {
        self.state.set(on);
        info!("DL(sim): {}", if on { "ON" } else { "OFF" });
        Ok(on)
    }

    fn get_state(&mut self) -> Result<bool, HardwareError> {
        Ok(self.state.get())
    }

    fn is_simulated(&self) -> bool {
        true
    }
}

pub struct GpioLight<P> {
    pin: P,
    gpio: u8,
}

impl<P: StatefulOutputPin> GpioLight<P> {
    pub fn new(pin: P, gpio: u8) -> Self {
        Self { pin, gpio }
    }
}

impl<P: StatefulOutputPin + Send> LightPort for GpioLight<P> {
    fn set_state(&mut self, on: bool) -> Result<bool, HardwareError> {
        let res = if on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        res.map_err(|e| HardwareError::write(self.gpio, &e))?;
        info!("DL: GPIO{} {}", self.gpio, if on { "HIGH" } else { "LOW" });
        Ok(on)
    }

    fn get_state(&mut self) -> Result<bool, HardwareError> {
        self.pin
            .is_set_high()
            .map_err(|e| HardwareError::read(self.gpio, &e))
    }

    fn is_simulated(&self) -> bool {
        false
    }
}
