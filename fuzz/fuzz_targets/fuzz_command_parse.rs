//! Fuzz target: `Command::parse`
//!
//! Feeds arbitrary UTF-8 lines to the console grammar.
//!
//! Invariants checked:
//! - No panics under any input
//! - Whitespace-only input is always `Ok(None)`
//! - Parsing is case-insensitive
//!
//! cargo fuzz run fuzz_command_parse

#![no_main]

use libfuzzer_sys::fuzz_target;
use smarthome::app::commands::Command;

fuzz_target!(|data: &[u8]| {
    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };

    let parsed = Command::parse(line);

    if line.trim().is_empty() {
        assert_eq!(parsed, Ok(None));
    }

    // Lowercasing is what the parser does first, so the result must not
    // depend on the input's case.
    assert_eq!(Command::parse(&line.to_lowercase()), parsed);
});
