//! Fuzz target for the `KEY=VALUE` mode declaration scanner and the identity
//! inspection that reads it back.
//!
//! Run with: cargo +nightly fuzz run fuzz_mode_declaration

#![no_main]

use libfuzzer_sys::fuzz_target;
use opencode_bridge_core::identity;
use opencode_bridge_core::mode::parse_mode_declaration;

fuzz_target!(|data: &[u8]| {
    let content = String::from_utf8_lossy(data);
    if let Some(value) = parse_mode_declaration(&content, "MAESTRO_MODE") {
        assert!(!value.is_empty());
        assert_eq!(value, value.trim());
    }
    let _ = identity::inspect(&content, "MAESTRO_MODE");
});
