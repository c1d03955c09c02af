//! Real-mode device bindings driven through the mock GPIO bank.
//!
//! Each test starts a full [`Controller`] with hardware-backed devices
//! and checks the pin traffic and the events that come out.

use std::thread;
use std::time::{Duration, Instant};

use smarthome::config::{ConfigError, DeviceConfig, DeviceId, Settings, ShellOptions};
use smarthome::error::{Error, HardwareError};
use smarthome::shell::Controller;

use super::mock_pins::{EventCollector, MockBank};

fn fast() -> ShellOptions {
    ShellOptions {
        time_unit: Duration::from_millis(5),
        join_timeout_units: 200,
        poll_interval: Duration::from_millis(1),
    }
}

fn wait_until(mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(3);
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    done()
}

fn start(settings: &Settings, bank: &mut MockBank) -> (Controller, EventCollector) {
    let events = EventCollector::default();
    let controller = Controller::start(settings, Some(bank), events.clone(), fast()).unwrap();
    (controller, events)
}

fn keypad() -> DeviceConfig {
    DeviceConfig {
        simulated: false,
        rows: Some(vec![5, 6, 13, 19]),
        cols: Some(vec![12, 16, 20, 21]),
        ..DeviceConfig::default()
    }
}

// ── Actuators ─────────────────────────────────────────────────

#[test]
fn real_light_drives_and_reads_back_pin() {
    let settings = Settings::default().with_device(DeviceId::Dl, DeviceConfig::real(18));
    let mut bank = MockBank::new();
    let (mut ctl, _) = start(&settings, &mut bank);

    assert_eq!(ctl.handle_line("dl on").lines, vec!["✓ Door Light turned ON"]);
    assert!(bank.level(18));
    assert_eq!(ctl.handle_line("dl status").lines, vec!["Door Light status: ON"]);
    assert!(
        ctl.handle_line("actuators")
            .lines
            .contains(&"  DL: Real - Status: ON".to_string())
    );

    ctl.handle_line("dl off");
    assert_eq!(bank.writes(18), vec![true, false]);
    assert!(ctl.shutdown().is_clean());
}

#[test]
fn light_pin_fault_becomes_reply_text() {
    let settings = Settings::default().with_device(DeviceId::Dl, DeviceConfig::real(18));
    let mut bank = MockBank::new();
    let (mut ctl, _) = start(&settings, &mut bank);

    bank.break_pin(18);
    let reply = ctl.handle_line("dl on");
    assert_eq!(reply.lines.len(), 1);
    assert!(reply.lines[0].starts_with("Error: Door Light (DL)"));
    assert!(reply.lines[0].contains("GPIO18"));
    ctl.shutdown();
}

#[test]
fn real_buzzer_pulses_pin_for_duration() {
    let settings = Settings::default().with_device(DeviceId::Db, DeviceConfig::real(17));
    let mut bank = MockBank::new();
    let (mut ctl, _) = start(&settings, &mut bank);

    let started = Instant::now();
    let reply = ctl.handle_line("db activate 1500 2");
    assert_eq!(reply.lines, vec!["✓ Buzzer activation started: 1500Hz for 2s"]);

    assert!(wait_until(|| bank.writes(17) == vec![true, false]));
    assert!(started.elapsed() >= Duration::from_millis(10));

    let report = ctl.shutdown();
    assert_eq!(report.jobs.joined.len(), 1);
}

// ── Sensors ───────────────────────────────────────────────────

#[test]
fn real_button_reports_each_press_once() {
    let settings = Settings::default().with_device(DeviceId::Ds1, DeviceConfig::real(25));
    let mut bank = MockBank::new();
    let (ctl, events) = start(&settings, &mut bank);
    assert!(bank.configured().contains(&(25, "input")));

    // Active-low: pulled up at rest.
    thread::sleep(Duration::from_millis(20));
    assert_eq!(events.count("[DS1] Button Pressed"), 0);

    bank.set_input(25, false);
    assert!(wait_until(|| events.count("[DS1] Button Pressed") == 1));
    thread::sleep(Duration::from_millis(20));
    assert_eq!(events.count("[DS1] Button Pressed"), 1);

    bank.set_input(25, true);
    thread::sleep(Duration::from_millis(20));
    bank.set_input(25, false);
    assert!(wait_until(|| events.count("[DS1] Button Pressed") == 2));

    assert!(ctl.shutdown().is_clean());
}

#[test]
fn real_pir_reports_motion() {
    let settings = Settings::default().with_device(DeviceId::Dpir1, DeviceConfig::real(26));
    let mut bank = MockBank::new();
    let (ctl, events) = start(&settings, &mut bank);

    bank.set_input(26, true);
    assert!(wait_until(|| events.count("[DPIR1] Motion detected") == 1));
    assert!(ctl.shutdown().is_clean());
}

#[test]
fn real_keypad_reports_key_down_only() {
    let settings = Settings::default().with_device(DeviceId::Dms, keypad());
    let mut bank = MockBank::new();
    let (ctl, events) = start(&settings, &mut bank);

    // Row 2 (GPIO13) × col 2 (GPIO20) is '9'.
    bank.wire(20, 13);
    assert!(wait_until(|| events.count("[DMS] Button pressed: 9") == 1));
    thread::sleep(Duration::from_millis(20));
    assert_eq!(events.messages(), vec!["[DMS] Button pressed: 9"]);

    bank.unwire(20);
    bank.wire(12, 5);
    assert!(wait_until(|| events.count("[DMS] Button pressed: 1") == 1));
    assert!(ctl.shutdown().is_clean());
}

#[test]
fn real_ultrasonic_without_echo_reports_nothing() {
    let mut cfg = DeviceConfig::real(23);
    cfg.extra.insert("echo_pin".into(), 24.into());
    let settings = Settings::default().with_device(DeviceId::Dus1, cfg);
    let mut bank = MockBank::new();
    let (mut ctl, events) = start(&settings, &mut bank);

    assert!(wait_until(|| bank.writes(23).len() >= 4));
    assert!(events.messages().is_empty());
    assert!(
        ctl.handle_line("sensors")
            .lines
            .contains(&"  DUS1: Real - Running".to_string())
    );
    assert!(ctl.shutdown().is_clean());
}

#[test]
fn crashed_sensor_loop_is_listed_as_stopped() {
    let settings = Settings::default().with_device(DeviceId::Ds1, DeviceConfig::real(25));
    let mut bank = MockBank::new();
    let (mut ctl, _) = start(&settings, &mut bank);

    bank.break_pin(25);
    assert!(wait_until(|| {
        ctl.handle_line("sensors")
            .lines
            .contains(&"  DS1: Real - Stopped".to_string())
    }));
    assert!(ctl.shutdown().is_clean());
}

// ── Startup failures ──────────────────────────────────────────

#[test]
fn missing_echo_pin_fails_startup() {
    let settings = Settings::default().with_device(DeviceId::Dus1, DeviceConfig::real(23));
    let mut bank = MockBank::new();
    let err = Controller::start(&settings, Some(&mut bank), EventCollector::default(), fast())
        .err()
        .unwrap();
    assert!(matches!(
        err,
        Error::Config(ConfigError::MissingPin {
            device: DeviceId::Dus1,
            field: "echo_pin"
        })
    ));
}

#[test]
fn shared_pin_fails_startup_before_any_loop_runs() {
    let settings = Settings::default()
        .with_device(DeviceId::Dl, DeviceConfig::real(25))
        .with_device(DeviceId::Ds1, DeviceConfig::real(25));
    let mut bank = MockBank::new();
    let events = EventCollector::default();
    let err = Controller::start(&settings, Some(&mut bank), events.clone(), fast())
        .err()
        .unwrap();
    assert!(matches!(
        err,
        Error::Hardware(HardwareError::Acquire { gpio: 25, .. })
    ));
    thread::sleep(Duration::from_millis(20));
    assert!(events.messages().is_empty());
}

#[test]
fn real_device_without_backend_fails_startup() {
    let settings = Settings::default().with_device(DeviceId::Db, DeviceConfig::real(17));
    let err = Controller::start::<MockBank>(&settings, None, EventCollector::default(), fast())
        .err()
        .unwrap();
    assert!(matches!(err, Error::Hardware(HardwareError::Unavailable)));
}
