//! Filtered decoding: time ranges, wildcard patterns, and early
//! termination, driven through both `DecodeSession` and the
//! `IrStreamReader::search` iterator.

use clp_decoder::{DecodeSession, IrStreamReader, NextEvent};
use clp_tests::{SAMPLE_REFERENCE, drain, sample_stream};
use clp_types::{LogEvent, QueryFilter, WildcardQuery};

const T: i64 = SAMPLE_REFERENCE;

fn indices(events: &[LogEvent]) -> Vec<u64> {
    events.iter().map(LogEvent::index).collect()
}

fn run(filter: &QueryFilter) -> (Vec<LogEvent>, NextEvent, u64) {
    let bytes = sample_stream();
    let mut session = DecodeSession::new(bytes.as_slice());
    session.decode_preamble().unwrap();
    let (events, end) = drain(&mut session, Some(filter)).unwrap();
    (events, end, session.decoded_count())
}

// ── Patterns ──────────────────────────────────────────────────────────────────

#[test]
fn pattern_match_is_case_insensitive_by_default() {
    let filter = QueryFilter::builder().add_pattern("*error*").build().unwrap();
    let (events, end, decoded) = run(&filter);
    assert_eq!(indices(&events), [4, 6]);
    assert_eq!(end, NextEvent::EndOfStream);
    assert_eq!(decoded, 8);
}

#[test]
fn case_sensitive_pattern_skips_capitalized_match() {
    let filter = QueryFilter::builder()
        .case_sensitive(true)
        .add_pattern("*error*")
        .build()
        .unwrap();
    let (events, _, _) = run(&filter);
    assert_eq!(indices(&events), [6]);
}

#[test]
fn any_of_several_patterns_accepts() {
    let filter = QueryFilter::builder()
        .add_patterns(["*port ????", "*user=svc_*"])
        .build()
        .unwrap();
    let (events, _, _) = run(&filter);
    assert_eq!(indices(&events), [0, 2]);
}

#[test]
fn pattern_must_cover_the_whole_message() {
    let filter = QueryFilter::builder().add_pattern("GET /health").build().unwrap();
    assert!(run(&filter).0.is_empty());

    let filter = QueryFilter::builder().add_pattern("GET /health *").build().unwrap();
    assert_eq!(indices(&run(&filter).0), [3]);
}

#[test]
fn escaped_wildcards_match_literally() {
    let bytes = clp_tests::encode_events(T, &[(T, "progress 50*"), (T, "progress 50%"), (T, "who? me")]);
    let filter = QueryFilter::builder()
        .add_wildcard_query(WildcardQuery::new(r"progress 50\*"))
        .add_wildcard_query(WildcardQuery::new(r"who\? *"))
        .build()
        .unwrap();
    let mut reader = IrStreamReader::new(bytes.as_slice()).unwrap();
    let messages: Vec<String> = reader
        .search(&filter)
        .map(|e| e.unwrap().into_message())
        .collect();
    assert_eq!(messages, ["progress 50*", "who? me"]);
}

// ── Time range ────────────────────────────────────────────────────────────────

#[test]
fn range_end_stops_the_scan() {
    let filter = QueryFilter::builder().begin(T + 300).end(T + 70_000).build().unwrap();
    let (events, end, decoded) = run(&filter);
    assert_eq!(indices(&events), [2, 3, 4]);
    assert_eq!(end, NextEvent::NoMoreMatches);
    // The record that triggered termination was decoded but not returned.
    assert_eq!(decoded, 6);
}

#[test]
fn termination_margin_delays_the_stop() {
    let filter = QueryFilter::builder()
        .begin(T + 300)
        .end(T + 70_000)
        .termination_margin(1)
        .build()
        .unwrap();
    let (events, end, decoded) = run(&filter);
    assert_eq!(indices(&events), [2, 3, 4]);
    assert_eq!(end, NextEvent::NoMoreMatches);
    assert_eq!(decoded, 7);
}

#[test]
fn begin_only_range_runs_to_the_end() {
    let filter = QueryFilter::builder().begin(T + 70_000).build().unwrap();
    let (events, end, _) = run(&filter);
    assert_eq!(indices(&events), [4, 5, 6, 7]);
    assert_eq!(end, NextEvent::EndOfStream);
}

#[test]
fn range_and_pattern_combine() {
    let filter = QueryFilter::builder()
        .end(T + 100_000)
        .add_pattern("*error*")
        .build()
        .unwrap();
    let (events, end, decoded) = run(&filter);
    assert_eq!(indices(&events), [4]);
    assert_eq!(end, NextEvent::NoMoreMatches);
    assert_eq!(decoded, 7);
}

#[test]
fn reader_stays_done_after_no_more_matches() {
    let bytes = sample_stream();
    let filter = QueryFilter::builder().end(T).build().unwrap();

    let mut reader = IrStreamReader::new(bytes.as_slice()).unwrap();
    assert_eq!(reader.search(&filter).count(), 1);
    assert_eq!(reader.search(&filter).count(), 0);
    assert_eq!(reader.decoded_count(), 2);
}

// ── Decoded count ─────────────────────────────────────────────────────────────

#[test]
fn decoded_count_ignores_the_filter() {
    let unfiltered = run(&QueryFilter::new()).2;
    let rejecting_all = run(&QueryFilter::builder().add_pattern("no such line").build().unwrap());
    assert!(rejecting_all.0.is_empty());
    assert_eq!(rejecting_all.2, unfiltered);
}

#[test]
fn one_filter_serves_many_sessions() {
    let filter = QueryFilter::builder().add_pattern("*error*").build().unwrap();
    let bytes = sample_stream();
    let (bytes, filter) = (bytes.as_slice(), &filter);

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(move || {
                    let mut session = DecodeSession::new(bytes);
                    session.decode_preamble().unwrap();
                    indices(&drain(&mut session, Some(filter)).unwrap().0)
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), [4, 6]);
        }
    });
}

#[test]
fn filter_can_switch_between_calls() {
    let bytes = sample_stream();
    let errors = QueryFilter::builder().add_pattern("*error*").build().unwrap();
    let mut session = DecodeSession::new(bytes.as_slice());
    session.decode_preamble().unwrap();

    let first = session.decode_next(Some(&errors)).unwrap().into_event().unwrap();
    assert_eq!(first.index(), 4);
    let next = session.decode_next(None).unwrap().into_event().unwrap();
    assert_eq!(next.index(), 5);
    assert_eq!(next.message(), "WARN retry 3 of 5 for job-7f3a");
}
