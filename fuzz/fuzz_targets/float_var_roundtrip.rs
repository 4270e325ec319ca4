#![no_main]

use clp_wire::encoded_var::{decode_float_var, encode_float_var};
use libfuzzer_sys::fuzz_target;

// Fuzz target: float variable encode->decode roundtrip.
//
// Any text encode_float_var accepts must decode back byte for byte.
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Some(encoded) = encode_float_var(text) {
        assert_eq!(decode_float_var(encoded).as_deref(), Some(text));
    }
});
