//! Mock GPIO bank for integration tests.
//!
//! Every pin handed out shares one level table, so a test can drive an
//! input from outside and read back what an output was set to.  An input
//! can also be wired to an output, which is how a keypad crosspoint is
//! closed.  A pin marked faulty fails every read and write.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use embedded_hal::digital::{self, ErrorKind, ErrorType, InputPin, OutputPin, StatefulOutputPin};
use smarthome::app::events::SensorEvent;
use smarthome::app::ports::EventSink;
use smarthome::drivers::gpio::{PinBank, Pull};
use smarthome::error::HardwareError;

// ── Event collector ───────────────────────────────────────────

/// Sink that keeps every event for later assertions.
#[derive(Clone, Default)]
pub struct EventCollector(Arc<Mutex<Vec<SensorEvent>>>);

#[allow(dead_code)]
impl EventCollector {
    pub fn messages(&self) -> Vec<String> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .map(|e| format!("[{}] {}", e.source, e.message))
            .collect()
    }

    pub fn count(&self, message: &str) -> usize {
        self.messages().iter().filter(|m| m.as_str() == message).count()
    }
}

impl EventSink for EventCollector {
    fn emit(&self, event: &SensorEvent) {
        self.0.lock().unwrap().push(event.clone());
    }
}

// ── Mock board ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct MockFault;

impl digital::Error for MockFault {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

#[derive(Default)]
struct Board {
    levels: HashMap<u8, bool>,
    /// input gpio → output gpio it currently follows.
    wires: HashMap<u8, u8>,
    writes: HashMap<u8, Vec<bool>>,
    configured: Vec<(u8, &'static str)>,
    faulty: HashSet<u8>,
}

impl Board {
    fn claim(&self, gpio: u8) -> Result<(), HardwareError> {
        if self.configured.iter().any(|(g, _)| *g == gpio) {
            return Err(HardwareError::Acquire {
                gpio,
                reason: "pin already in use".into(),
            });
        }
        Ok(())
    }

    fn level(&self, gpio: u8) -> bool {
        match self.wires.get(&gpio) {
            Some(out) => self.levels.get(out).copied().unwrap_or(false),
            None => self.levels.get(&gpio).copied().unwrap_or(false),
        }
    }
}

#[derive(Clone, Default)]
pub struct MockBank {
    board: Arc<Mutex<Board>>,
}

#[allow(dead_code)]
impl MockBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drive an input pin from outside.
    pub fn set_input(&self, gpio: u8, high: bool) {
        self.board.lock().unwrap().levels.insert(gpio, high);
    }

    /// Connect `input` to `output` (e.g. hold a keypad key down).
    pub fn wire(&self, input: u8, output: u8) {
        self.board.lock().unwrap().wires.insert(input, output);
    }

    /// Make every later access to `gpio` fail.
    pub fn break_pin(&self, gpio: u8) {
        self.board.lock().unwrap().faulty.insert(gpio);
    }

    pub fn unwire(&self, input: u8) {
        self.board.lock().unwrap().wires.remove(&input);
    }

    pub fn level(&self, gpio: u8) -> bool {
        self.board.lock().unwrap().level(gpio)
    }

    pub fn writes(&self, gpio: u8) -> Vec<bool> {
        self.board
            .lock()
            .unwrap()
            .writes
            .get(&gpio)
            .cloned()
            .unwrap_or_default()
    }

    pub fn configured(&self) -> Vec<(u8, &'static str)> {
        self.board.lock().unwrap().configured.clone()
    }
}

pub struct MockPin {
    gpio: u8,
    board: Arc<Mutex<Board>>,
}

impl ErrorType for MockPin {
    type Error = MockFault;
}

impl InputPin for MockPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        let board = self.board.lock().unwrap();
        if board.faulty.contains(&self.gpio) {
            return Err(MockFault);
        }
        Ok(board.level(self.gpio))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|h| !h)
    }
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(true)
    }
}

impl StatefulOutputPin for MockPin {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        self.is_high()
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        self.is_low()
    }
}

impl MockPin {
    fn write(&self, high: bool) -> Result<(), MockFault> {
        let mut board = self.board.lock().unwrap();
        if board.faulty.contains(&self.gpio) {
            return Err(MockFault);
        }
        board.levels.insert(self.gpio, high);
        board.writes.entry(self.gpio).or_default().push(high);
        Ok(())
    }
}

impl PinBank for MockBank {
    type Input = MockPin;
    type Output = MockPin;

    fn input(&mut self, gpio: u8, pull: Pull) -> Result<MockPin, HardwareError> {
        let mut board = self.board.lock().unwrap();
        board.claim(gpio)?;
        if pull == Pull::Up {
            board.levels.entry(gpio).or_insert(true);
        }
        board.configured.push((gpio, "input"));
        Ok(MockPin {
            gpio,
            board: Arc::clone(&self.board),
        })
    }

    fn output(&mut self, gpio: u8) -> Result<MockPin, HardwareError> {
        let mut board = self.board.lock().unwrap();
        board.claim(gpio)?;
        board.levels.insert(gpio, false);
        board.configured.push((gpio, "output"));
        Ok(MockPin {
            gpio,
            board: Arc::clone(&self.board),
        })
    }
}
