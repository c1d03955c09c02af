//! GPIO capability: hands out configured input and output pins.
//!
//! Drivers are generic over the `embedded-hal` digital traits and never
//! see a concrete GPIO API.  A [`PinBank`] is the only thing that knows
//! how to turn a BCM pin number into a pin object.
//!
//! ## Dual-target design
//!
//! With the `rpi` feature: [`RppalBank`] configures real pins through
//! `/dev/gpiomem` via `rppal`.
//! Without it: [`NoHardware`] refuses every request, so a settings file
//! that asks for real devices fails at startup with a clear message.

use embedded_hal::digital::{InputPin, StatefulOutputPin};

use crate::error::HardwareError;

/// Input bias resistor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pull {
    None,
    Up,
    Down,
}

/// Source of configured pins.  Pin setup is the one-time init step that
/// real-mode devices run before their loop starts.
pub trait PinBank {
    type Input: InputPin + Send + 'static;
    type Output: StatefulOutputPin + Send + 'static;

    fn input(&mut self, gpio: u8, pull: Pull) -> Result<Self::Input, HardwareError>;

    /// Configure `gpio` as an output, driven low.
    fn output(&mut self, gpio: u8) -> Result<Self::Output, HardwareError>;
}

// ── No backend ────────────────────────────────────────────────

/// Placeholder bank for builds without a GPIO backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHardware;

impl NoHardware {
    pub fn open() -> Result<Self, HardwareError> {
        Err(HardwareError::Unavailable)
    }
}

/// Pin type of [`NoHardware`]; cannot be constructed.
#[derive(Debug)]
pub enum NoPin {}

impl embedded_hal::digital::ErrorType for NoPin {
    type Error = core::convert::Infallible;
}

impl InputPin for NoPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        match *self {}
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        match *self {}
    }
}

impl embedded_hal::digital::OutputPin for NoPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        match *self {}
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        match *self {}
    }
}

impl StatefulOutputPin for NoPin {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        match *self {}
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        match *self {}
    }
}

impl PinBank for NoHardware {
    type Input = NoPin;
    type Output = NoPin;

    fn input(&mut self, _gpio: u8, _pull: Pull) -> Result<NoPin, HardwareError> {
        Err(HardwareError::Unavailable)
    }

    fn output(&mut self, _gpio: u8) -> Result<NoPin, HardwareError> {
        Err(HardwareError::Unavailable)
    }
}

// ── Raspberry Pi backend ──────────────────────────────────────

#[cfg(feature = "rpi")]
pub struct RppalBank {
    gpio: rppal::gpio::Gpio,
}

#[cfg(feature = "rpi")]
impl RppalBank {
    pub fn open() -> Result<Self, HardwareError> {
        let gpio = rppal::gpio::Gpio::new().map_err(|e| HardwareError::Acquire {
            gpio: 0,
            reason: e.to_string(),
        })?;
        log::info!("gpio: rppal backend opened");
        Ok(Self { gpio })
    }

    fn pin(&self, gpio: u8) -> Result<rppal::gpio::Pin, HardwareError> {
        self.gpio.get(gpio).map_err(|e| HardwareError::Acquire {
            gpio,
            reason: e.to_string(),
        })
    }
}

#[cfg(feature = "rpi")]
impl PinBank for RppalBank {
    type Input = rppal::gpio::InputPin;
    type Output = rppal::gpio::OutputPin;

    fn input(&mut self, gpio: u8, pull: Pull) -> Result<Self::Input, HardwareError> {
        let pin = self.pin(gpio)?;
        let input = match pull {
            Pull::None => pin.into_input(),
            Pull::Up => pin.into_input_pullup(),
            Pull::Down => pin.into_input_pulldown(),
        };
        log::info!("gpio: GPIO{} configured as input ({:?})", gpio, pull);
        Ok(input)
    }

    fn output(&mut self, gpio: u8) -> Result<Self::Output, HardwareError> {
        let output = self.pin(gpio)?.into_output_low();
        log::info!("gpio: GPIO{} configured as output", gpio);
        Ok(output)
    }
}

/// The bank real-mode devices use in this build.
#[cfg(feature = "rpi")]
pub type DefaultBank = RppalBank;

/// The bank real-mode devices use in this build.
#[cfg(not(feature = "rpi"))]
pub type DefaultBank = NoHardware;

// ── Test pins ─────────────────────────────────────────────────
