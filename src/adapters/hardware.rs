//! Hardware adapter — turns settings into device bindings.
//!
//! This is the only module that decides, per device, between the
//! simulated and the GPIO-backed implementation.  Everything it builds
//! is handed out behind port traits.
//!
//! Real-mode devices configure their pins here, before any thread
//! starts, so a pin fault is a startup error rather than a dead loop.

use std::sync::Arc;
use std::time::Duration;

use log::{error, info};

use crate::app::dispatcher::Actuators;
use crate::app::events::SensorEvent;
use crate::app::ports::{BuzzerPort, LightPort, ValueSource};
use crate::config::{DeviceConfig, DeviceId, Settings, ShellOptions};
use crate::drivers::buzzer::{GpioBuzzer, SimulatedBuzzer};
use crate::drivers::gpio::{PinBank, Pull};
use crate::drivers::light::{GpioLight, LightState, SimulatedLight};
use crate::error::{HardwareError, Result};
use crate::sensors::binary::{DigitalInput, SimulatedSwitch};
use crate::sensors::edge::{Distance, EdgeRule, KeyPress, RisingEdge};
use crate::sensors::keypad::{MatrixKeypad, SimulatedKeypad};
use crate::sensors::ultrasonic::{EchoRanger, SimulatedRanger};
use crate::sensors::{Pacing, run_loop};
use crate::supervisor::{StopSignal, TaskGroup};

use super::log_sink::EventLog;

/// Key in a `DUS1` record naming the echo pin.
pub const ECHO_PIN_KEY: &str = "echo_pin";

fn require_bank<B: PinBank>(pins: Option<&mut B>) -> core::result::Result<&mut B, HardwareError> {
    pins.ok_or(HardwareError::Unavailable)
}

// ── Actuators ─────────────────────────────────────────────────

/// Build the light and buzzer bindings for every configured actuator.
///
/// `pins` is `None` when no GPIO backend was opened; a real-mode
/// actuator then fails with [`HardwareError::Unavailable`].
pub fn build_actuators<B: PinBank>(
    settings: &Settings,
    mut pins: Option<&mut B>,
    options: &ShellOptions,
) -> Result<Actuators> {
    let mut actuators = Actuators::default();

    if let Some(cfg) = settings.get(DeviceId::Dl) {
        let light: Box<dyn LightPort> = if cfg.simulated {
            Box::new(SimulatedLight::new(LightState::default()))
        } else {
            let gpio = cfg.required_pin(DeviceId::Dl)?;
            let pin = require_bank(pins.as_deref_mut())?.output(gpio)?;
            Box::new(GpioLight::new(pin, gpio))
        };
        actuators.light = Some(light);
        info!("DL (Door Light) initialized (simulated: {})", cfg.simulated);
    }

    if let Some(cfg) = settings.get(DeviceId::Db) {
        let buzzer: Arc<dyn BuzzerPort> = if cfg.simulated {
            Arc::new(SimulatedBuzzer::new(options.time_unit))
        } else {
            let gpio = cfg.required_pin(DeviceId::Db)?;
            let pin = require_bank(pins.as_deref_mut())?.output(gpio)?;
            Arc::new(GpioBuzzer::new(pin, gpio, options.time_unit))
        };
        actuators.buzzer = Some(buzzer);
        info!("DB (Door Buzzer) initialized (simulated: {})", cfg.simulated);
    }

    Ok(actuators)
}

// ── Sensors ───────────────────────────────────────────────────

/// A sensor whose source is initialised and whose loop is ready to run.
pub struct PreparedSensor {
    pub id: DeviceId,
    pub simulated: bool,
    body: Box<dyn FnOnce(StopSignal, Arc<EventLog>) + Send>,
}

impl PreparedSensor {
    fn new<S, R>(id: DeviceId, simulated: bool, source: S, poll: Option<Duration>, rule: R) -> Self
    where
        S: ValueSource + 'static,
        R: EdgeRule<Reading = S::Reading> + 'static,
    {
        let body = move |stop: StopSignal, log: Arc<EventLog>| {
            info!("{}: sensor loop started", id);
            let result = run_loop(
                source,
                poll,
                rule,
                |message| {
                    log.push(&SensorEvent::now(id, message));
                },
                &stop,
            );
            match result {
                Ok(()) => info!("{}: sensor loop stopped", id),
                Err(e) => error!("{}: sensor loop failed: {}", id, e),
            }
        };
        Self {
            id,
            simulated,
            body: Box::new(body),
        }
    }

    /// Start the loop on a thread named after the device.
    pub fn spawn(self, group: &TaskGroup, stop: &StopSignal, log: &Arc<EventLog>) -> Result<()> {
        let stop = stop.clone();
        let log = Arc::clone(log);
        let body = self.body;
        group.spawn(self.id.as_str(), move || body(stop, log))
    }
}

/// Initialise every configured sensor, in listing order.
///
/// Nothing is spawned; if any device fails, the error is returned and
/// no loop has started.
pub fn prepare_sensors<B: PinBank>(
    settings: &Settings,
    mut pins: Option<&mut B>,
    options: &ShellOptions,
) -> Result<Vec<PreparedSensor>> {
    let mut prepared = Vec::new();
    for id in DeviceId::SENSORS {
        if let Some(cfg) = settings.get(id) {
            prepared.push(prepare_sensor(id, cfg, pins.as_deref_mut(), options)?);
            info!("{} ({}) initialized (simulated: {})", id, id.description(), cfg.simulated);
        }
    }
    Ok(prepared)
}

fn prepare_sensor<B: PinBank>(
    id: DeviceId,
    cfg: &DeviceConfig,
    pins: Option<&mut B>,
    options: &ShellOptions,
) -> Result<PreparedSensor> {
    let unit = options.time_unit;
    let short = Pacing::units(unit, 0.5, 3.0);

    if cfg.simulated {
        let sensor = match id {
            DeviceId::Ds1 => PreparedSensor::new(
                id,
                true,
                SimulatedSwitch::new(short),
                None,
                RisingEdge::new(RisingEdge::BUTTON),
            ),
            DeviceId::Dpir1 => PreparedSensor::new(
                id,
                true,
                SimulatedSwitch::new(short),
                None,
                RisingEdge::new(RisingEdge::MOTION),
            ),
            DeviceId::Dus1 => {
                PreparedSensor::new(id, true, SimulatedRanger::new(short), None, Distance)
            }
            _ => PreparedSensor::new(
                id,
                true,
                SimulatedKeypad::new(Pacing::units(unit, 1.0, 5.0)),
                None,
                KeyPress,
            ),
        };
        return Ok(sensor);
    }

    let poll = Some(options.poll_interval);
    let bank = require_bank(pins)?;
    let sensor = match id {
        DeviceId::Ds1 => {
            let gpio = cfg.required_pin(id)?;
            let pin = bank.input(gpio, Pull::Up)?;
            PreparedSensor::new(
                id,
                false,
                DigitalInput::active_low(pin, gpio),
                poll,
                RisingEdge::new(RisingEdge::BUTTON),
            )
        }
        DeviceId::Dpir1 => {
            let gpio = cfg.required_pin(id)?;
            let pin = bank.input(gpio, Pull::Down)?;
            PreparedSensor::new(
                id,
                false,
                DigitalInput::active_high(pin, gpio),
                poll,
                RisingEdge::new(RisingEdge::MOTION),
            )
        }
        DeviceId::Dus1 => {
            let trigger_gpio = cfg.required_pin(id)?;
            let echo_gpio = cfg.extra_pin(id, ECHO_PIN_KEY)?;
            let trigger = bank.output(trigger_gpio)?;
            let echo = bank.input(echo_gpio, Pull::None)?;
            PreparedSensor::new(
                id,
                false,
                EchoRanger::new(trigger, trigger_gpio, echo, echo_gpio),
                poll,
                Distance,
            )
        }
        _ => {
            let (row_gpios, col_gpios) = cfg.matrix_pins(id)?;
            let mut rows = Vec::with_capacity(row_gpios.len());
            for &gpio in row_gpios {
                rows.push((bank.output(gpio)?, gpio));
            }
            let mut cols = Vec::with_capacity(col_gpios.len());
            for &gpio in col_gpios {
                cols.push((bank.input(gpio, Pull::Down)?, gpio));
            }
            PreparedSensor::new(id, false, MatrixKeypad::new(rows, cols)?, poll, KeyPress)
        }
    };
    Ok(sensor)
}
