//! End-to-end console behaviour with every device simulated.

use std::thread;
use std::time::{Duration, Instant};

use smarthome::config::{DeviceConfig, DeviceId, Settings, ShellOptions};
use smarthome::drivers::gpio::NoHardware;
use smarthome::shell::Controller;

use super::mock_pins::EventCollector;

fn options(unit_ms: u64) -> ShellOptions {
    ShellOptions {
        time_unit: Duration::from_millis(unit_ms),
        join_timeout_units: 20,
        poll_interval: Duration::from_millis(1),
    }
}

fn simulated(ids: &[DeviceId]) -> Settings {
    ids.iter().fold(Settings::default(), |s, id| {
        s.with_device(*id, DeviceConfig::simulated())
    })
}

fn everything() -> Settings {
    let mut ids = DeviceId::SENSORS.to_vec();
    ids.extend(DeviceId::ACTUATORS);
    simulated(&ids)
}

fn start(settings: &Settings, unit_ms: u64) -> (Controller, EventCollector) {
    let events = EventCollector::default();
    let ctl =
        Controller::start::<NoHardware>(settings, None, events.clone(), options(unit_ms)).unwrap();
    (ctl, events)
}

#[test]
fn buzzer_acknowledges_immediately_and_finishes_later() {
    let (mut ctl, _) = start(&simulated(&[DeviceId::Db]), 50);

    let started = Instant::now();
    let reply = ctl.handle_line("db activate 1500 2");
    assert!(started.elapsed() < Duration::from_millis(50));
    assert_eq!(reply.lines, vec!["✓ Buzzer activation started: 1500Hz for 2s"]);

    let report = ctl.shutdown();
    assert!(started.elapsed() >= Duration::from_millis(100));
    assert_eq!(report.jobs.joined.len(), 1);
    assert!(report.is_clean());
}

#[test]
fn default_buzzer_arguments() {
    let (mut ctl, _) = start(&simulated(&[DeviceId::Db]), 1);
    assert_eq!(
        ctl.handle_line("db activate").lines,
        vec!["✓ Buzzer activation started: 1000Hz for 1s"]
    );
    assert_eq!(
        ctl.handle_line("db activate 440").lines,
        vec!["✓ Buzzer activation started: 440Hz for 1s"]
    );
    ctl.shutdown();
}

#[test]
fn unknown_command_changes_nothing() {
    let (mut ctl, _) = start(&simulated(&[DeviceId::Dl]), 1);
    ctl.handle_line("dl on");

    let reply = ctl.handle_line("foo bar");
    assert_eq!(
        reply.lines,
        vec!["Unknown command: foo", "Type 'help' for available commands"]
    );
    assert!(!reply.quit);
    assert!(!ctl.is_stopping());
    assert_eq!(ctl.handle_line("dl status").lines, vec!["Door Light status: ON"]);
    ctl.shutdown();
}

#[test]
fn listings_cover_configured_and_missing_devices() {
    let (mut ctl, _) = start(&simulated(&[DeviceId::Ds1, DeviceId::Dms, DeviceId::Dl]), 5);

    let sensors = ctl.handle_line("sensors").lines;
    for expected in [
        "  DS1: Simulated - Running",
        "  DUS1: Not configured",
        "  DPIR1: Not configured",
        "  DMS: Simulated - Running",
    ] {
        assert!(sensors.contains(&expected.to_string()), "{expected}");
    }

    let actuators = ctl.handle_line("actuators").lines;
    assert!(actuators.contains(&"  DL: Simulated - Status: OFF".to_string()));
    assert!(actuators.contains(&"  DB: Not configured".to_string()));

    assert_eq!(
        ctl.handle_line("db activate").lines,
        vec!["Error: Door Buzzer (DB) not configured"]
    );
    ctl.shutdown();
}

#[test]
fn simulated_sensors_produce_events() {
    let (ctl, events) = start(&everything(), 1);
    let deadline = Instant::now() + Duration::from_secs(3);
    let wanted = ["[DS1] Button Pressed", "[DPIR1] Motion detected"];
    while Instant::now() < deadline && wanted.iter().any(|w| events.count(w) == 0) {
        thread::sleep(Duration::from_millis(5));
    }
    let messages = events.messages();
    for w in wanted {
        assert!(messages.iter().any(|m| m == w), "missing {w}");
    }
    assert!(messages.iter().any(|m| m.starts_with("[DUS1] Distance: ")));
    assert!(ctl.shutdown().is_clean());
}

#[test]
fn no_events_after_quit() {
    let (mut ctl, events) = start(&everything(), 1);
    thread::sleep(Duration::from_millis(20));

    let reply = ctl.handle_line("quit");
    assert!(reply.quit);
    assert_eq!(reply.lines, vec!["Shutting down..."]);

    let report = ctl.shutdown();
    assert!(report.is_clean());
    assert_eq!(report.sensors.joined.len(), 4);

    let settled = events.messages().len();
    thread::sleep(Duration::from_millis(30));
    assert_eq!(events.messages().len(), settled);
}

#[test]
fn light_sequence_reports_last_value() {
    let (mut ctl, _) = start(&simulated(&[DeviceId::Dl]), 1);
    for cmd in ["dl on", "dl off", "DL ON", "dl on", "dl  off"] {
        ctl.handle_line(cmd);
    }
    assert_eq!(ctl.handle_line("dl status").lines, vec!["Door Light status: OFF"]);
    ctl.shutdown();
}
