//! SmartHome PI1 — Main Entry Point
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                     │
//! │                                                               │
//! │  hardware (device factory)   ConsoleSink (EventSink)          │
//! │  PinBank: RppalBank | NoHardware                              │
//! │                                                               │
//! │  ──────────────── Port Trait Boundary ───────────────────     │
//! │                                                               │
//! │  ┌───────────────────────────────────────────────────────┐    │
//! │  │  Dispatcher · sensor loops · edge rules                │    │
//! │  └───────────────────────────────────────────────────────┘    │
//! │                                                               │
//! │  shell (console) · supervisor (threads, stop signal)          │
//! └───────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use log::info;
use tracing_subscriber::filter::LevelFilter;

use smarthome::adapters::log_sink::ConsoleSink;
use smarthome::config::{Settings, ShellOptions};
use smarthome::drivers::gpio::DefaultBank;
use smarthome::shell::{Controller, run_console};

/// Environment variable selecting log verbosity.
const LOG_ENV: &str = "SMARTHOME_LOG";

fn init_logging() {
    let level = std::env::var(LOG_ENV)
        .ok()
        .and_then(|v| v.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::INFO);

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    init_logging();
    info!("SmartHome PI1 v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Settings ───────────────────────────────────────────
    let path = Settings::resolve_path(std::env::args_os().nth(1).map(PathBuf::from));
    let settings = Settings::load(&path)
        .with_context(|| format!("loading settings from {}", path.display()))?;
    info!("settings loaded from {}", path.display());

    // ── 3. Devices ────────────────────────────────────────────
    let mut bank = if settings.any_real() {
        Some(DefaultBank::open().context("opening GPIO")?)
    } else {
        None
    };
    let controller = Controller::start(
        &settings,
        bank.as_mut(),
        ConsoleSink::new(),
        ShellOptions::default(),
    )
    .context("starting devices")?;

    // ── 4. Ctrl-C ─────────────────────────────────────────────
    let stop = controller.stop_signal();
    ctrlc::set_handler(move || stop.trigger()).context("installing Ctrl-C handler")?;

    // ── 5. Console ────────────────────────────────────────────
    let report = run_console(
        controller,
        BufReader::new(io::stdin()),
        &mut io::stdout(),
    )?;
    if !report.is_clean() {
        info!("exiting with abandoned tasks still running");
    }
    Ok(())
}
