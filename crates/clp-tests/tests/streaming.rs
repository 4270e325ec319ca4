//! Streaming behavior of the decode engine.
//!
//! - **Ordering**: an unfiltered scan yields every record with consecutive
//!   indices and the timestamps that were encoded, then `EndOfStream`.
//!
//! - **Chunk-boundary independence**: however the source splits the bytes
//!   (one byte at a time, odd sizes, one big read), the decoded events are
//!   identical.
//!
//! - **Truncation**: a source that runs dry inside a record fails with
//!   `IncompleteStream`; one that runs dry exactly between records ends
//!   cleanly with `EndOfStream`. Checked at every possible cut point.

use clp_decoder::{DecodeError, DecodeSession, NextEvent, ReaderSource};
use clp_tests::{ChunkedSource, SAMPLE_REFERENCE, decode_all, drain, sample_events, sample_stream};

// ── Ordering ──────────────────────────────────────────────────────────────────

#[test]
fn unfiltered_scan_yields_every_record_in_order() {
    let bytes = sample_stream();
    let mut session = DecodeSession::new(bytes.as_slice());
    let metadata = session.decode_preamble().unwrap();
    assert_eq!(metadata.reference_timestamp(), SAMPLE_REFERENCE);
    assert_eq!(metadata.timezone_id(), "America/Toronto");

    let (events, end) = drain(&mut session, None).unwrap();
    assert_eq!(end, NextEvent::EndOfStream);

    let expected = sample_events();
    assert_eq!(events.len(), expected.len());
    for (i, (event, (ts, message))) in events.iter().zip(&expected).enumerate() {
        assert_eq!(event.index(), i as u64);
        assert_eq!(event.timestamp(), *ts);
        assert_eq!(event.message(), *message);
    }
    assert!(events.windows(2).all(|w| w[0].timestamp() <= w[1].timestamp()));
    assert_eq!(session.decoded_count(), expected.len() as u64);
}

#[test]
fn end_of_stream_is_sticky() {
    let bytes = sample_stream();
    let mut session = DecodeSession::new(bytes.as_slice());
    session.decode_preamble().unwrap();
    drain(&mut session, None).unwrap();
    for _ in 0..3 {
        assert_eq!(session.decode_next(None).unwrap(), NextEvent::EndOfStream);
    }
}

#[test]
fn events_share_one_metadata_instance() {
    let events = decode_all(sample_stream().as_slice()).unwrap();
    let first = events[0].metadata();
    assert!(events.iter().all(|e| std::sync::Arc::ptr_eq(e.metadata(), first)));
}

// ── Chunk-boundary independence ───────────────────────────────────────────────

#[test]
fn chunk_size_does_not_change_output() {
    let bytes = sample_stream();
    let whole = decode_all(bytes.as_slice()).unwrap();

    for sizes in [&[1][..], &[2], &[3], &[7], &[64], &[4096], &[1, 5, 2, 13], &[17, 1]] {
        let source = ChunkedSource::new(bytes.clone(), sizes);
        let chunked = decode_all(source).unwrap();
        assert_eq!(chunked, whole, "chunk pattern {sizes:?}");
    }
}

#[test]
fn reader_source_with_tiny_chunks_matches() {
    let bytes = sample_stream();
    let whole = decode_all(bytes.as_slice()).unwrap();
    let trickled = decode_all(ReaderSource::with_chunk_size(bytes.as_slice(), 1)).unwrap();
    assert_eq!(trickled, whole);
}

#[test]
fn source_is_only_read_when_needed() {
    let bytes = sample_stream();
    let len = bytes.len();
    let mut session = DecodeSession::new(ChunkedSource::new(bytes, &[len]));
    session.decode_preamble().unwrap();
    drain(&mut session, None).unwrap();
    assert_eq!(session.into_source().reads(), 1);
}

// ── Truncation ────────────────────────────────────────────────────────────────

/// Stream offsets at which each record ends, plus where the records begin.
fn record_boundaries(bytes: &[u8]) -> (u64, Vec<u64>) {
    let mut session = DecodeSession::new(bytes);
    session.decode_preamble().unwrap();
    let start = session.position();
    let mut ends = Vec::new();
    while let NextEvent::Event(_) = session.decode_next(None).unwrap() {
        ends.push(session.position());
    }
    (start, ends)
}

#[test]
fn every_cut_is_either_incomplete_or_a_clean_end() {
    let bytes = sample_stream();
    let (records_start, ends) = record_boundaries(&bytes);
    let last_record_end = *ends.last().unwrap();
    // The only byte after the last record is the end-of-stream marker.
    assert_eq!(last_record_end + 1, bytes.len() as u64);

    for cut in records_start..=last_record_end {
        let prefix = &bytes[..usize::try_from(cut).unwrap()];
        let mut session = DecodeSession::new(ChunkedSource::new(prefix.to_vec(), &[3]));
        session.decode_preamble().unwrap();

        let complete = ends.iter().filter(|&&end| end <= cut).count();
        let result = drain(&mut session, None);

        if cut == records_start || ends.contains(&cut) {
            let (events, end) = result.unwrap_or_else(|e| panic!("cut {cut}: {e}"));
            assert_eq!(events.len(), complete, "cut {cut}");
            assert_eq!(end, NextEvent::EndOfStream, "cut {cut}");
        } else {
            match result {
                Err(DecodeError::IncompleteStream { buffered }) => {
                    let expected = cut - ends.iter().rev().find(|&&e| e < cut).copied().unwrap_or(records_start);
                    assert_eq!(buffered as u64, expected, "cut {cut}");
                    assert_eq!(session.decoded_count(), complete as u64, "cut {cut}");
                }
                other => panic!("cut {cut}: expected IncompleteStream, got {other:?}"),
            }
        }
    }
}

#[test]
fn cut_inside_preamble_is_incomplete() {
    let bytes = sample_stream();
    let (records_start, _) = record_boundaries(&bytes);
    for cut in 0..usize::try_from(records_start).unwrap() {
        let mut session = DecodeSession::new(&bytes[..cut]);
        let result = session.decode_preamble();
        assert!(
            matches!(result, Err(DecodeError::IncompleteStream { .. })),
            "cut {cut}: {result:?}"
        );
    }
}
