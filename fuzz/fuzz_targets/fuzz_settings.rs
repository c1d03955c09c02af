//! Fuzz target: `Settings::from_json`
//!
//! Arbitrary bytes as a settings file.  Whatever parses must answer the
//! per-device pin accessors without panicking.
//!
//! cargo fuzz run fuzz_settings

#![no_main]

use libfuzzer_sys::fuzz_target;
use smarthome::config::Settings;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(settings) = Settings::from_json(text) else {
        return;
    };

    for (id, cfg) in settings.iter() {
        let _ = cfg.required_pin(id);
        let _ = cfg.extra_pin(id, "echo_pin");
        let _ = cfg.matrix_pins(id);
    }
    let _ = settings.any_real();
});
