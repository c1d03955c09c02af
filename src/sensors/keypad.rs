//! Door membrane switch (DMS): a 4×4 keypad.
//!
//! ```text
//!          col0 col1 col2 col3
//!   row0    1    2    3    A
//!   row1    4    5    6    B
//!   row2    7    8    9    C
//!   row3    *    0    #    D
//! ```
//!
//! The simulated keypad "presses" a random key on some samples.  The
//! hardware keypad drives one row high at a time and reads the
//! pull-down columns; a key reports once per press, however long it is
//! held.

use embedded_hal::digital::{InputPin, OutputPin};
use heapless::Vec;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::Pacing;
use crate::app::ports::ValueSource;
use crate::config::{ConfigError, DeviceId};
use crate::error::{HardwareError, Result};

pub const MATRIX_SIZE: usize = 4;

/// Key symbols in row-major order.
pub const KEYPAD_SYMBOLS: [char; MATRIX_SIZE * MATRIX_SIZE] = [
    '1', '2', '3', 'A', //
    '4', '5', '6', 'B', //
    '7', '8', '9', 'C', //
    '*', '0', '#', 'D',
];

/// Chance that a simulated sample carries a key press.
pub const KEY_PROBABILITY: f64 = 0.3;

pub struct SimulatedKeypad {
    rng: StdRng,
    pacing: Pacing,
}

impl SimulatedKeypad {
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

impl ValueSource for SimulatedKeypad {
    type Reading = Option<char>;

    fn sample(&mut self) -> Result<Option<char>> {
        self.pacing.pause(&mut self.rng);
        if !self.rng.random_bool(KEY_PROBABILITY) {
            return Ok(None);
        }
        let idx = self.rng.random_range(0..KEYPAD_SYMBOLS.len());
        Ok(Some(KEYPAD_SYMBOLS[idx]))
    }
}

/// Row/column scanned keypad.
pub struct MatrixKeypad<R, C> {
    rows: Vec<(R, u8), MATRIX_SIZE>,
    cols: Vec<(C, u8), MATRIX_SIZE>,
    held: Option<char>,
}

impl<R: OutputPin, C: InputPin> MatrixKeypad<R, C> {
    /// Each pin is paired with its BCM number for error reporting.
    pub fn new(
        rows: impl IntoIterator<Item = (R, u8)>,
        cols: impl IntoIterator<Item = (C, u8)>,
    ) -> Result<Self> {
        let too_many = ConfigError::InvalidMatrix {
            device: DeviceId::Dms,
            reason: "keypad supports at most 4 rows and 4 cols",
        };
        let mut row_pins = Vec::new();
        for r in rows {
            row_pins.push(r).map_err(|_| too_many.clone())?;
        }
        let mut col_pins = Vec::new();
        for c in cols {
            col_pins.push(c).map_err(|_| too_many.clone())?;
        }
        Ok(Self {
            rows: row_pins,
            cols: col_pins,
            held: None,
        })
    }

    /// The key currently down, if any.  The first closed crosspoint in
    /// row-major order wins.
    pub fn scan(&mut self) -> Result<Option<char>> {
        for (r, (row, row_gpio)) in self.rows.iter_mut().enumerate() {
            row.set_high()
                .map_err(|e| HardwareError::write(*row_gpio, &e))?;

            let mut hit = None;
            for (c, (col, col_gpio)) in self.cols.iter_mut().enumerate() {
                let closed = col
                    .is_high()
                    .map_err(|e| HardwareError::read(*col_gpio, &e))?;
                if closed {
                    hit = Some(KEYPAD_SYMBOLS[r * MATRIX_SIZE + c]);
                    break;
                }
            }

            row.set_low()
                .map_err(|e| HardwareError::write(*row_gpio, &e))?;
            if hit.is_some() {
                return Ok(hit);
            }
        }
        Ok(None)
    }
}

impl<R, C> ValueSource for MatrixKeypad<R, C>
where
    R: OutputPin + Send,
    C: InputPin + Send,
{
    type Reading = Option<char>;

    /// Reports a key only on the sample where it goes down.
    fn sample(&mut self) -> Result<Option<char>> {
        let down = self.scan()?;
        let fresh = down.filter(|k| self.held != Some(*k));
        if let Some(k) = fresh {
            debug!("DMS: key down '{}'", k);
        }
        self.held = down;
        Ok(fresh)
    }
}
