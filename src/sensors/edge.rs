//! Per-sensor edge/filter rules.
//!
//! A rule turns a raw reading into an optional console message.  The
//! sensor loop invokes its callback only when the rule yields `Some`.

pub trait EdgeRule: Send {
    type Reading;

    fn apply(&mut self, reading: Self::Reading) -> Option<String>;
}

/// Fires on a 0 → 1 transition between consecutive samples.
///
/// The previous state starts at 0, so a sensor that boots already
/// asserted reports once.  Repeated 1-readings report nothing.
#[derive(Debug, Clone)]
pub struct RisingEdge {
    previous: bool,
    message: &'static str,
}

impl RisingEdge {
    pub const BUTTON: &'static str = "Button Pressed";
    pub const MOTION: &'static str = "Motion detected";

    pub fn new(message: &'static str) -> Self {
        Self {
            previous: false,
            message,
        }
    }
}

impl EdgeRule for RisingEdge {
    type Reading = bool;

    fn apply(&mut self, active: bool) -> Option<String> {
        let rose = active && !self.previous;
        self.previous = active;
        rose.then(|| self.message.to_string())
    }
}

/// Reports every distance sample, unfiltered.  `None` (no echo) is
/// skipped.
#[derive(Debug, Clone, Default)]
pub struct Distance;

impl EdgeRule for Distance {
    type Reading = Option<u32>;

    fn apply(&mut self, reading: Option<u32>) -> Option<String> {
        reading.map(|cm| format!("Distance: {cm} cm"))
    }
}

/// Reports a keypad symbol whenever one was produced.
#[derive(Debug, Clone, Default)]
pub struct KeyPress;

impl EdgeRule for KeyPress {
    type Reading = Option<char>;

    fn apply(&mut self, reading: Option<char>) -> Option<String> {
        reading.map(|key| format!("Button pressed: {key}"))
    }
}
