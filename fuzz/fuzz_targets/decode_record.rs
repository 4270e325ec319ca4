#![no_main]

use clp_wire::{decode_one_record, DecodeStatus};
use libfuzzer_sys::fuzz_target;

// Fuzz target: decode_one_record on arbitrary bytes.
//
// Catches bugs in:
// - Length-prefixed variable and logtype parsing
// - Placeholder expansion against the variable lists
// - Float variable unpacking
// - Reporting success with `consumed` beyond the input
fuzz_target!(|data: &[u8]| {
    if let DecodeStatus::Success { consumed, .. } = decode_one_record(data) {
        assert!(consumed <= data.len());
        // A record that decoded must decode identically from its exact bytes.
        assert!(decode_one_record(&data[..consumed]).is_success());
    }
});
