//! Unified error types for the controller.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! startup path's error handling uniform.  Command-line mistakes made by
//! the user are *not* errors at this level; the dispatcher turns them
//! into text (see [`crate::app::commands::CommandError`]).

use core::fmt;

use embedded_hal::digital::ErrorKind;

use crate::config::ConfigError;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the controller funnels into this type.
#[derive(Debug)]
pub enum Error {
    /// Settings file missing, malformed, or incomplete for a device.
    Config(ConfigError),
    /// A pin could not be acquired, read, or written.
    Hardware(HardwareError),
    /// The OS refused to start a worker thread.
    Spawn { task: String, reason: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Hardware(e) => write!(f, "hardware: {e}"),
            Self::Spawn { task, reason } => write!(f, "spawn '{task}': {reason}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Hardware errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HardwareError {
    /// Real mode requested but this build has no GPIO backend.
    Unavailable,
    /// The GPIO backend refused to hand out the pin.
    Acquire { gpio: u8, reason: String },
    /// Reading an input pin failed.
    Read { gpio: u8, kind: ErrorKind },
    /// Driving an output pin failed.
    Write { gpio: u8, kind: ErrorKind },
}

impl HardwareError {
    pub fn read(gpio: u8, e: &impl embedded_hal::digital::Error) -> Self {
        Self::Read { gpio, kind: e.kind() }
    }

    pub fn write(gpio: u8, e: &impl embedded_hal::digital::Error) -> Self {
        Self::Write { gpio, kind: e.kind() }
    }
}

impl fmt::Display for HardwareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => {
                write!(f, "GPIO support not compiled in (rebuild with --features rpi)")
            }
            Self::Acquire { gpio, reason } => write!(f, "GPIO{gpio} unavailable: {reason}"),
            Self::Read { gpio, kind } => write!(f, "GPIO{gpio} read failed ({kind:?})"),
            Self::Write { gpio, kind } => write!(f, "GPIO{gpio} write failed ({kind:?})"),
        }
    }
}

impl std::error::Error for HardwareError {}

impl From<HardwareError> for Error {
    fn from(e: HardwareError) -> Self {
        Self::Hardware(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
