#![no_main]

use arbitrary::Arbitrary;
use clp_decoder::IrStreamReader;
use clp_encoder::IrEncoder;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzEvent {
    timestamp: i64,
    message: String,
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    reference_timestamp: i64,
    events: Vec<FuzzEvent>,
}

// Fuzz target: IrEncoder -> IrStreamReader roundtrip.
//
// Every message and timestamp the encoder accepts must come back unchanged.
// Timestamp pairs whose delta overflows are rejected by the encoder and
// skipped here.
fuzz_target!(|input: FuzzInput| {
    let mut encoder = IrEncoder::new(input.reference_timestamp);
    for event in &input.events {
        encoder.add_event(event.timestamp, event.message.as_str());
    }
    let Ok(bytes) = encoder.encode() else {
        return;
    };

    let decoded: Vec<(i64, String)> = IrStreamReader::new(bytes.as_slice())
        .expect("encoder output has a valid preamble")
        .map(|event| {
            let event = event.expect("encoder output decodes");
            (event.timestamp(), event.into_message())
        })
        .collect();
    let expected: Vec<(i64, String)> = input
        .events
        .into_iter()
        .map(|event| (event.timestamp, event.message))
        .collect();
    assert_eq!(decoded, expected);
});
