//! Console command grammar.
//!
//! `<verb> [<subcommand>] [<arg>...]`, whitespace-separated and
//! case-insensitive.  Parsing is pure; the
//! [`Dispatcher`](super::dispatcher::Dispatcher) acts on the result.

use core::fmt;

pub const DEFAULT_FREQUENCY_HZ: u32 = 1000;
pub const DEFAULT_DURATION_S: u32 = 1;

pub const LIGHT_USAGE: &str = "Usage: dl <on|off|status>";
pub const BUZZER_USAGE: &str = "Usage: db activate [frequency] [duration]";

/// Commands the console understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Light(LightAction),
    /// Sound the buzzer on a background job.
    Buzzer {
        frequency_hz: u32,
        duration_s: u32,
    },
    /// List sensor modes and loop liveness.
    Sensors,
    /// List actuator modes and the light's state.
    Actuators,
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightAction {
    On,
    Off,
    Status,
}

/// Why a line was rejected.  Rendered to the user, never propagated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Known verb, missing or unknown subcommand.
    Usage(&'static str),
    /// A numeric argument did not parse.
    InvalidInteger(String),
    /// Verb not in the grammar.
    Unknown(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Usage(usage) => f.write_str(usage),
            Self::InvalidInteger(arg) => write!(f, "Error: {arg} is not a valid integer"),
            Self::Unknown(verb) => write!(f, "Unknown command: {verb}"),
        }
    }
}

impl Command {
    /// Parse one console line.  Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let lowered = line.trim().to_lowercase();
        let mut words = lowered.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let sub = words.next();

        let cmd = match verb {
            "dl" => Self::Light(match sub {
                Some("on") => LightAction::On,
                Some("off") => LightAction::Off,
                Some("status") => LightAction::Status,
                _ => return Err(CommandError::Usage(LIGHT_USAGE)),
            }),
            "db" => match sub {
                Some("activate") => Self::Buzzer {
                    frequency_hz: int_arg(words.next(), DEFAULT_FREQUENCY_HZ)?,
                    duration_s: int_arg(words.next(), DEFAULT_DURATION_S)?,
                },
                _ => return Err(CommandError::Usage(BUZZER_USAGE)),
            },
            "sensors" => Self::Sensors,
            "actuators" => Self::Actuators,
            "help" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(cmd))
    }
}

fn int_arg(word: Option<&str>, default: u32) -> Result<u32, CommandError> {
    match word {
        None => Ok(default),
        Some(w) => w
            .parse()
            .map_err(|_| CommandError::InvalidInteger(w.to_string())),
    }
}

/// Command summary printed by `help` and at startup.
pub fn help_text() -> Vec<String> {
    let rule = "=".repeat(50);
    [
        rule.as_str(),
        "Smart Home Control System - PI1",
        rule.as_str(),
        "Commands:",
        "  dl on          - Turn Door Light ON",
        "  dl off         - Turn Door Light OFF",
        "  dl status      - Check Door Light status",
        "  db activate    - Activate Door Buzzer (default: 1000Hz, 1s)",
        "  db activate <freq> <duration> - Activate buzzer with custom settings",
        "  sensors        - Show sensor status",
        "  actuators      - Show actuator status",
        "  help           - Show this menu",
        "  quit/exit      - Exit application",
        rule.as_str(),
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}
