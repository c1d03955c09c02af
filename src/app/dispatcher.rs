//! Command dispatcher — routes parsed console commands to the actuators.
//!
//! [`Dispatcher`] owns the actuator bindings and read-only views of the
//! sensor supervisor.  It never returns an error: every failure, whether
//! a bad command line, an unconfigured device or a pin fault, becomes
//! reply text.
//!
//! ```text
//!  console line ──▶ Command::parse ──▶ Dispatcher ──▶ LightPort
//!                                          │      └──▶ BuzzerPort (job thread)
//!                                          └──▶ Reply { lines, quit }
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{error, info};

use crate::config::{DeviceId, Settings};
use crate::supervisor::{StopSignal, TaskGroup};

use super::commands::{Command, CommandError, LightAction, help_text};
use super::ports::{BuzzerPort, LightPort};

// ───────────────────────────────────────────────────────────────
// Actuator set
// ───────────────────────────────────────────────────────────────

/// The actuator bindings built at startup.  `None` means the device is
/// not in the settings file.
#[derive(Default)]
pub struct Actuators {
    pub light: Option<Box<dyn LightPort>>,
    pub buzzer: Option<Arc<dyn BuzzerPort>>,
}

// ───────────────────────────────────────────────────────────────
// Reply
// ───────────────────────────────────────────────────────────────

/// Text produced by one command.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Reply {
    pub lines: Vec<String>,
    /// The command asked the shell to shut down.
    pub quit: bool,
}

impl Reply {
    fn line(text: impl Into<String>) -> Self {
        Self {
            lines: vec![text.into()],
            quit: false,
        }
    }

    fn lines(lines: Vec<String>) -> Self {
        Self { lines, quit: false }
    }
}

// ───────────────────────────────────────────────────────────────
// Dispatcher
// ───────────────────────────────────────────────────────────────

pub struct Dispatcher {
    actuators: Actuators,
    /// Configured sensors and whether each is simulated.
    sensor_modes: BTreeMap<DeviceId, bool>,
    sensors: Arc<TaskGroup>,
    jobs: Arc<TaskGroup>,
    stop: StopSignal,
    job_seq: u64,
}

impl Dispatcher {
    pub fn new(
        settings: &Settings,
        actuators: Actuators,
        sensors: Arc<TaskGroup>,
        jobs: Arc<TaskGroup>,
        stop: StopSignal,
    ) -> Self {
        let sensor_modes = settings
            .iter()
            .filter(|(id, _)| id.is_sensor())
            .map(|(id, cfg)| (id, cfg.simulated))
            .collect();
        Self {
            actuators,
            sensor_modes,
            sensors,
            jobs,
            stop,
            job_seq: 0,
        }
    }

    /// Handle one console line.
    pub fn dispatch(&mut self, line: &str) -> Reply {
        match Command::parse(line) {
            Ok(None) => Reply::default(),
            Ok(Some(cmd)) => self.execute(cmd),
            Err(e @ CommandError::Unknown(_)) => Reply::lines(vec![
                e.to_string(),
                "Type 'help' for available commands".to_string(),
            ]),
            Err(e) => Reply::line(e.to_string()),
        }
    }

    pub fn execute(&mut self, cmd: Command) -> Reply {
        match cmd {
            Command::Light(action) => self.light(action),
            Command::Buzzer {
                frequency_hz,
                duration_s,
            } => self.buzzer(frequency_hz, duration_s),
            Command::Sensors => self.sensor_status(),
            Command::Actuators => self.actuator_status(),
            Command::Help => Reply::lines(help_text()),
            Command::Quit => {
                info!("dispatcher: quit requested");
                self.stop.trigger();
                Reply {
                    lines: vec!["Shutting down...".to_string()],
                    quit: true,
                }
            }
        }
    }

    // ── Actuators ─────────────────────────────────────────────

    fn light(&mut self, action: LightAction) -> Reply {
        let Some(light) = self.actuators.light.as_mut() else {
            return not_configured(DeviceId::Dl);
        };
        let result = match action {
            LightAction::On => light
                .set_state(true)
                .map(|_| "✓ Door Light turned ON".to_string()),
            LightAction::Off => light
                .set_state(false)
                .map(|_| "✓ Door Light turned OFF".to_string()),
            LightAction::Status => light
                .get_state()
                .map(|on| format!("Door Light status: {}", on_off(on))),
        };
        match result {
            Ok(text) => Reply::line(text),
            Err(e) => {
                error!("DL: {}", e);
                Reply::line(format!("Error: Door Light (DL): {e}"))
            }
        }
    }

    fn buzzer(&mut self, frequency_hz: u32, duration_s: u32) -> Reply {
        let Some(buzzer) = self.actuators.buzzer.clone() else {
            return not_configured(DeviceId::Db);
        };
        self.jobs.reap();

        let seq = self.job_seq;
        self.job_seq += 1;
        let spawned = self.jobs.spawn(format!("DB-job-{seq}"), move || {
            if let Err(e) = buzzer.activate(frequency_hz, duration_s) {
                error!("DB: activation failed: {}", e);
            }
        });
        match spawned {
            Ok(()) => Reply::line(format!(
                "✓ Buzzer activation started: {frequency_hz}Hz for {duration_s}s"
            )),
            Err(e) => {
                error!("DB: {}", e);
                Reply::line(format!("Error: {e}"))
            }
        }
    }

    // ── Status listings ───────────────────────────────────────

    fn sensor_status(&self) -> Reply {
        let mut lines = vec![String::new(), "Sensor Status:".to_string(), "-".repeat(30)];
        for id in DeviceId::SENSORS {
            let line = match self.sensor_modes.get(&id) {
                Some(&simulated) => {
                    let liveness = if self.sensors.is_running(id.as_str()) {
                        "Running"
                    } else {
                        "Stopped"
                    };
                    format!("  {id}: {} - {liveness}", mode(simulated))
                }
                None => format!("  {id}: Not configured"),
            };
            lines.push(line);
        }
        lines.push(String::new());
        Reply::lines(lines)
    }

    fn actuator_status(&mut self) -> Reply {
        let mut lines = vec![String::new(), "Actuator Status:".to_string(), "-".repeat(30)];

        lines.push(match self.actuators.light.as_mut() {
            Some(light) => {
                let status = match light.get_state() {
                    Ok(on) => on_off(on).to_string(),
                    Err(e) => format!("unreadable ({e})"),
                };
                format!("  DL: {} - Status: {status}", mode(light.is_simulated()))
            }
            None => "  DL: Not configured".to_string(),
        });
        lines.push(match self.actuators.buzzer.as_ref() {
            Some(buzzer) => format!("  DB: {} - Ready", mode(buzzer.is_simulated())),
            None => "  DB: Not configured".to_string(),
        });

        lines.push(String::new());
        Reply::lines(lines)
    }
}

fn not_configured(id: DeviceId) -> Reply {
    Reply::line(format!("Error: {} ({id}) not configured", id.description()))
}

fn mode(simulated: bool) -> &'static str {
    if simulated { "Simulated" } else { "Real" }
}

fn on_off(on: bool) -> &'static str {
    if on { "ON" } else { "OFF" }
}
