#![no_main]

use clp_decoder::{DecodeSession, NextEvent, ReaderSource};
use libfuzzer_sys::fuzz_target;

// Fuzz target: a full decode session over arbitrary bytes.
//
// The first byte picks the read chunk size so chunk-boundary handling in
// the cursor is exercised too. Every path must end in an event stream
// terminator or an error; never a panic or an infinite loop.
fuzz_target!(|data: &[u8]| {
    let Some((&chunk, stream)) = data.split_first() else {
        return;
    };
    let source = ReaderSource::with_chunk_size(stream, usize::from(chunk).max(1));
    let mut session = DecodeSession::new(source);
    if session.decode_preamble().is_err() {
        return;
    }

    let mut last_index = None;
    loop {
        match session.decode_next(None) {
            Ok(NextEvent::Event(event)) => {
                assert_eq!(event.index(), last_index.map_or(0, |i| i + 1));
                last_index = Some(event.index());
            }
            Ok(NextEvent::EndOfStream | NextEvent::NoMoreMatches) | Err(_) => break,
        }
    }
});
