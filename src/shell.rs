//! Presentation shell — the PI1 console.
//!
//! [`Controller`] owns the running system: actuator bindings behind the
//! dispatcher, one supervised loop per configured sensor, the buzzer job
//! group, and the event log the loops print through.  [`run_console`]
//! drives a controller from a line-oriented input until `quit`, end of
//! input, or an external stop (Ctrl-C).
//!
//! ```text
//!  stdin ── reader thread ──▶ mpsc ──▶ run_console ──▶ Controller::handle_line
//!                                          │
//!                                          └── StopSignal set? ──▶ shutdown
//! ```

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use log::{info, warn};

use crate::adapters::hardware::{build_actuators, prepare_sensors};
use crate::adapters::log_sink::EventLog;
use crate::app::commands::help_text;
use crate::app::dispatcher::{Dispatcher, Reply};
use crate::app::ports::EventSink;
use crate::config::{Settings, ShellOptions};
use crate::drivers::gpio::PinBank;
use crate::error::Result;
use crate::supervisor::{JoinReport, StopSignal, TaskGroup};

pub const PROMPT: &str = "PI1> ";

/// How often the console re-checks the stop signal while idle.
const INPUT_POLL: Duration = Duration::from_millis(100);

/// What shutdown managed to join.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ShutdownReport {
    pub sensors: JoinReport,
    pub jobs: JoinReport,
}

impl ShutdownReport {
    pub fn is_clean(&self) -> bool {
        self.sensors.is_clean() && self.jobs.is_clean()
    }
}

// ───────────────────────────────────────────────────────────────
// Controller
// ───────────────────────────────────────────────────────────────

pub struct Controller {
    dispatcher: Dispatcher,
    events: Arc<EventLog>,
    sensors: Arc<TaskGroup>,
    jobs: Arc<TaskGroup>,
    stop: StopSignal,
    options: ShellOptions,
}

impl Controller {
    /// Initialise every configured device and start the sensor loops.
    ///
    /// All devices are initialised before any loop starts, so a failing
    /// device leaves nothing running.
    pub fn start<B: PinBank>(
        settings: &Settings,
        mut pins: Option<&mut B>,
        sink: impl EventSink + 'static,
        options: ShellOptions,
    ) -> Result<Self> {
        info!("Initializing actuators...");
        let actuators = build_actuators(settings, pins.as_deref_mut(), &options)?;

        info!("Starting sensors...");
        let prepared = prepare_sensors(settings, pins.as_deref_mut(), &options)?;

        let stop = StopSignal::new();
        let events = Arc::new(EventLog::new(sink));
        let sensors = Arc::new(TaskGroup::new("sensors"));
        let jobs = Arc::new(TaskGroup::new("buzzer"));

        for sensor in prepared {
            if let Err(e) = sensor.spawn(&sensors, &stop, &events) {
                stop.trigger();
                sensors.join_all(options.join_timeout());
                return Err(e);
            }
        }
        info!("{} sensor loop(s) running", sensors.len());

        let dispatcher = Dispatcher::new(
            settings,
            actuators,
            Arc::clone(&sensors),
            Arc::clone(&jobs),
            stop.clone(),
        );
        Ok(Self {
            dispatcher,
            events,
            sensors,
            jobs,
            stop,
            options,
        })
    }

    /// Handle to the shared stop signal, for external triggers.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn is_stopping(&self) -> bool {
        self.stop.is_set()
    }

    pub fn handle_line(&mut self, line: &str) -> Reply {
        self.dispatcher.dispatch(line)
    }

    /// Stop loops, close the event log, then wait (bounded) for sensor
    /// loops and buzzer jobs.  Stragglers are abandoned.
    pub fn shutdown(self) -> ShutdownReport {
        self.stop.trigger();
        self.events.close();

        let bound = self.options.join_timeout();
        let sensors = self.sensors.join_all(bound);
        let jobs = self.jobs.join_all(bound);

        let report = ShutdownReport { sensors, jobs };
        if report.is_clean() {
            info!("shutdown complete");
        } else {
            warn!(
                "shutdown abandoned {} sensor loop(s), {} buzzer job(s)",
                report.sensors.abandoned.len(),
                report.jobs.abandoned.len()
            );
        }
        report
    }
}

impl Drop for Controller {
    /// A controller dropped without [`Controller::shutdown`] still stops
    /// its loops and silences the event log; nothing is joined.
    fn drop(&mut self) {
        if !self.events.is_closed() {
            warn!("controller dropped without shutdown, stopping sensor loops");
            self.stop.trigger();
            self.events.close();
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Console loop
// ───────────────────────────────────────────────────────────────

/// Run the interactive console until the controller is asked to stop.
///
/// `input` is read on its own thread so that an external stop (Ctrl-C)
/// is noticed while waiting for a line.  The controller is shut down on
/// every exit path, including a failed write to `out`.
pub fn run_console<R, W>(mut controller: Controller, input: R, out: &mut W) -> io::Result<ShutdownReport>
where
    R: BufRead + Send + 'static,
    W: Write,
{
    let session = console_session(&mut controller, input, out).and_then(|()| {
        writeln!(out, "Waiting for sensors to stop...")?;
        out.flush()
    });
    if let Err(e) = &session {
        warn!("console output failed: {e}");
    }

    let report = controller.shutdown();
    session?;
    writeln!(out, "Application stopped.")?;
    Ok(report)
}

fn console_session<R, W>(controller: &mut Controller, input: R, out: &mut W) -> io::Result<()>
where
    R: BufRead + Send + 'static,
    W: Write,
{
    for line in help_text() {
        writeln!(out, "{line}")?;
    }
    writeln!(out)?;
    writeln!(out, "Sensor data will appear below. Type commands to control actuators.")?;
    writeln!(out)?;
    writeln!(out, "{}", "-".repeat(50))?;

    let rx = spawn_reader(input)?;

    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;

        let line = loop {
            match rx.recv_timeout(INPUT_POLL) {
                Err(RecvTimeoutError::Disconnected) => {
                    writeln!(out, "\nShutting down...")?;
                    return Ok(());
                }
                _ if controller.is_stopping() => {
                    writeln!(out, "\n\nShutting down...")?;
                    return Ok(());
                }
                Ok(line) => break line,
                Err(RecvTimeoutError::Timeout) => {}
            }
        };

        let reply = controller.handle_line(&line);
        for text in &reply.lines {
            writeln!(out, "{text}")?;
        }
        if reply.quit {
            return Ok(());
        }
    }
}

/// Feed `input` line by line into a channel.  Bytes that are not UTF-8
/// are replaced rather than ending the session; the channel closes at
/// end of input or on a read error.
fn spawn_reader<R>(mut input: R) -> io::Result<Receiver<String>>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<String>();
    thread::Builder::new()
        .name("console-input".into())
        .spawn(move || {
            let mut buf = Vec::new();
            loop {
                buf.clear();
                match input.read_until(b'\n', &mut buf) {
                    Ok(0) => break,
                    Ok(_) => {
                        let line = String::from_utf8_lossy(&buf);
                        let line = line.trim_end_matches(['\n', '\r']).to_owned();
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("console input failed: {e}");
                        break;
                    }
                }
            }
        })?;
    Ok(rx)
}
