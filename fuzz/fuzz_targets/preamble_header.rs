#![no_main]

use clp_wire::{decode_preamble_header, detect_encoding_width, DecodeStatus};
use libfuzzer_sys::fuzz_target;

// Fuzz target: magic number detection and preamble header parsing.
//
// Input is treated as a whole stream: the first four bytes go to
// detect_encoding_width and the rest to decode_preamble_header.
fuzz_target!(|data: &[u8]| {
    let DecodeStatus::Success { consumed, .. } = detect_encoding_width(data) else {
        return;
    };
    let rest = &data[consumed..];
    if let DecodeStatus::Success { consumed, value } = decode_preamble_header(rest) {
        assert!(consumed <= rest.len());
        assert!(value.metadata(rest).is_some());
    }
});
