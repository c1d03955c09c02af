//! Event sinks and the shell's event log.
//!
//! Sensor loops push [`SensorEvent`]s into an [`EventLog`], which forwards
//! them to an [`EventSink`] until it is closed.  [`ConsoleSink`] prints to
//! stdout; a future MQTT or web adapter would implement the same trait.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use log::{debug, warn};

use crate::app::events::SensorEvent;
use crate::app::ports::EventSink;

/// Prints every event block to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for ConsoleSink {
    fn emit(&self, event: &SensorEvent) {
        let mut out = io::stdout().lock();
        if let Err(e) = writeln!(out, "\n{event}").and_then(|()| out.flush()) {
            warn!("console: event dropped: {}", e);
        }
    }
}

struct LogState {
    closed: bool,
    delivered: usize,
}

/// Gate between sensor loops and the sink.
///
/// Emission happens under the log's lock, so events never interleave and
/// nothing reaches the sink after [`close`](Self::close) returns.
pub struct EventLog {
    sink: Box<dyn EventSink>,
    state: Mutex<LogState>,
}

impl EventLog {
    pub fn new(sink: impl EventSink + 'static) -> Self {
        Self {
            sink: Box::new(sink),
            state: Mutex::new(LogState {
                closed: false,
                delivered: 0,
            }),
        }
    }

    /// Forward `event` to the sink.  Returns `false` once closed.
    pub fn push(&self, event: &SensorEvent) -> bool {
        let mut state = self.lock();
        if state.closed {
            debug!("event log closed, dropping [{}] {}", event.source, event.message);
            return false;
        }
        self.sink.emit(event);
        state.delivered += 1;
        true
    }

    pub fn close(&self) {
        self.lock().closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Events handed to the sink so far.
    pub fn delivered(&self) -> usize {
        self.lock().delivered
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LogState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
