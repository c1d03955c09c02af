//! Device settings.
//!
//! The settings file is a JSON object keyed by device identifier:
//!
//! ```json
//! {
//!   "DS1":  { "simulated": true,  "pin": 25 },
//!   "DUS1": { "simulated": false, "pin": 23, "echo_pin": 24 },
//!   "DMS":  { "simulated": false, "rows": [5, 6, 13, 19], "cols": [12, 16, 20, 21] },
//!   "DL":   { "simulated": true,  "pin": 18 }
//! }
//! ```
//!
//! A missing key means the device is not configured.  Unknown keys are
//! ignored with a warning.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

/// Default settings file name, looked up in the working directory first.
pub const SETTINGS_FILE: &str = "settings.json";

// ---------------------------------------------------------------------------
// Device identity
// ---------------------------------------------------------------------------

/// Every device the PI1 board knows about.  Declaration order is listing
/// order for the `sensors` / `actuators` commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DeviceId {
    Ds1,
    Dus1,
    Dpir1,
    Dms,
    Dl,
    Db,
}

impl DeviceId {
    pub const SENSORS: [DeviceId; 4] = [Self::Ds1, Self::Dus1, Self::Dpir1, Self::Dms];
    pub const ACTUATORS: [DeviceId; 2] = [Self::Dl, Self::Db];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ds1 => "DS1",
            Self::Dus1 => "DUS1",
            Self::Dpir1 => "DPIR1",
            Self::Dms => "DMS",
            Self::Dl => "DL",
            Self::Db => "DB",
        }
    }

    /// Human-readable name used in console messages.
    pub fn description(self) -> &'static str {
        match self {
            Self::Ds1 => "Door Sensor",
            Self::Dus1 => "Door Ultrasonic Sensor",
            Self::Dpir1 => "Door Motion Sensor",
            Self::Dms => "Door Membrane Switch",
            Self::Dl => "Door Light",
            Self::Db => "Door Buzzer",
        }
    }

    pub fn is_sensor(self) -> bool {
        Self::SENSORS.contains(&self)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DS1" => Ok(Self::Ds1),
            "DUS1" => Ok(Self::Dus1),
            "DPIR1" => Ok(Self::Dpir1),
            "DMS" => Ok(Self::Dms),
            "DL" => Ok(Self::Dl),
            "DB" => Ok(Self::Db),
            _ => Err(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Per-device record
// ---------------------------------------------------------------------------

/// One device entry from the settings file.  Immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Synthetic data generator instead of hardware.
    pub simulated: bool,
    /// BCM pin number (trigger pin for the ultrasonic sensor).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin: Option<u8>,
    /// Keypad row pins, driven as outputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<u8>>,
    /// Keypad column pins, read as pull-down inputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cols: Option<Vec<u8>>,
    /// Device-specific keys not covered above (e.g. `echo_pin`).
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl DeviceConfig {
    pub fn simulated() -> Self {
        Self {
            simulated: true,
            ..Self::default()
        }
    }

    pub fn real(pin: u8) -> Self {
        Self {
            simulated: false,
            pin: Some(pin),
            ..Self::default()
        }
    }

    /// `pin`, or a [`ConfigError::MissingPin`] naming the device.
    pub fn required_pin(&self, device: DeviceId) -> Result<u8, ConfigError> {
        self.pin.ok_or(ConfigError::MissingPin {
            device,
            field: "pin",
        })
    }

    /// A pin number stored under `key` in the extra map.
    pub fn extra_pin(&self, device: DeviceId, key: &'static str) -> Result<u8, ConfigError> {
        self.extra
            .get(key)
            .and_then(serde_json::Value::as_u64)
            .and_then(|v| u8::try_from(v).ok())
            .ok_or(ConfigError::MissingPin { device, field: key })
    }

    /// `rows` and `cols`, both required and both non-empty.
    pub fn matrix_pins(&self, device: DeviceId) -> Result<(&[u8], &[u8]), ConfigError> {
        let rows = self.rows.as_deref().ok_or(ConfigError::MissingPin {
            device,
            field: "rows",
        })?;
        let cols = self.cols.as_deref().ok_or(ConfigError::MissingPin {
            device,
            field: "cols",
        })?;
        if rows.is_empty() || cols.is_empty() {
            return Err(ConfigError::InvalidMatrix {
                device,
                reason: "rows and cols must each list at least one pin",
            });
        }
        Ok((rows, cols))
    }
}

// ---------------------------------------------------------------------------
// Whole settings file
// ---------------------------------------------------------------------------

/// The loaded settings file: device id → device record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    devices: BTreeMap<DeviceId, DeviceConfig>,
}

impl Settings {
    /// Read and parse a settings file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::NotFound(path.to_path_buf()),
            _ => ConfigError::Unreadable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            },
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let raw: BTreeMap<String, DeviceConfig> =
            serde_json::from_str(text).map_err(|e| ConfigError::Malformed(e.to_string()))?;

        let mut devices = BTreeMap::new();
        for (key, cfg) in raw {
            match key.parse::<DeviceId>() {
                Ok(id) => {
                    devices.insert(id, cfg);
                }
                Err(()) => warn!("Ignoring unknown device '{}' in settings", key),
            }
        }
        Ok(Self { devices })
    }

    /// Resolve which settings file to use.
    ///
    /// An explicit path always wins.  Otherwise `settings.json` in the
    /// working directory, then one level up.  Falls back to the working
    /// directory path so the caller reports a useful "not found".
    pub fn resolve_path(explicit: Option<PathBuf>) -> PathBuf {
        if let Some(path) = explicit {
            return path;
        }
        let local = PathBuf::from(SETTINGS_FILE);
        if local.exists() {
            return local;
        }
        let parent = Path::new("..").join(SETTINGS_FILE);
        if parent.exists() {
            return parent;
        }
        local
    }

    pub fn with_device(mut self, id: DeviceId, cfg: DeviceConfig) -> Self {
        self.devices.insert(id, cfg);
        self
    }

    pub fn get(&self, id: DeviceId) -> Option<&DeviceConfig> {
        self.devices.get(&id)
    }

    pub fn is_configured(&self, id: DeviceId) -> bool {
        self.devices.contains_key(&id)
    }

    /// True if any configured device needs the GPIO backend.
    pub fn any_real(&self) -> bool {
        self.devices.values().any(|d| !d.simulated)
    }

    pub fn iter(&self) -> impl Iterator<Item = (DeviceId, &DeviceConfig)> {
        self.devices.iter().map(|(id, cfg)| (*id, cfg))
    }
}

// ---------------------------------------------------------------------------
// Runtime tuning
// ---------------------------------------------------------------------------

/// Timing knobs for the shell.  Everything is expressed relative to
/// `time_unit` so tests can run the whole system at millisecond scale.
#[derive(Debug, Clone, Copy)]
pub struct ShellOptions {
    /// One "second" for buzzer durations and simulated sensor delays.
    pub time_unit: Duration,
    /// Bounded wait per task at shutdown, in time units.
    pub join_timeout_units: u32,
    /// Sleep between hardware samples in real mode.
    pub poll_interval: Duration,
}

impl ShellOptions {
    pub fn join_timeout(&self) -> Duration {
        self.time_unit * self.join_timeout_units
    }
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            time_unit: Duration::from_secs(1),
            join_timeout_units: 2,
            poll_interval: Duration::from_millis(500),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while loading or interpreting settings.  All are fatal
/// at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The settings file does not exist.
    NotFound(PathBuf),
    /// The file exists but could not be read.
    Unreadable { path: PathBuf, reason: String },
    /// The file is not a JSON object of device records.
    Malformed(String),
    /// A real-mode device lacks a pin field it needs.
    MissingPin {
        device: DeviceId,
        field: &'static str,
    },
    /// Keypad matrix pins are unusable.
    InvalidMatrix {
        device: DeviceId,
        reason: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "{} not found", path.display()),
            Self::Unreadable { path, reason } => {
                write!(f, "cannot read {}: {}", path.display(), reason)
            }
            Self::Malformed(msg) => write!(f, "malformed settings: {msg}"),
            Self::MissingPin { device, field } => {
                write!(f, "{device} is not simulated but has no '{field}'")
            }
            Self::InvalidMatrix { device, reason } => write!(f, "{device}: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}
