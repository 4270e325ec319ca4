//! Shared fixtures for the integration tests and benchmarks.

use std::io;

use clp_decoder::{ByteSource, DecodeError, DecodeSession, NextEvent};
use clp_encoder::IrEncoder;
use clp_types::{LogEvent, QueryFilter};

/// Reference timestamp of [`sample_stream`].
pub const SAMPLE_REFERENCE: i64 = 1_700_000_000_000;

/// A small service log with variables of every kind (integers, floats,
/// `key=value` dictionary tokens, plain dictionary tokens) and timestamps
/// that exercise all delta widths.
pub fn sample_events() -> Vec<(i64, &'static str)> {
    let t = SAMPLE_REFERENCE;
    vec![
        (t, "Starting server on port 8080"),
        (t + 5, "Loaded 42 routes in 0.75 s"),
        (t + 300, "Connected to db=primary as user=svc_api"),
        (t + 300, "GET /health 200 1.2 ms"),
        (t + 70_000, "Error: disk usage at 91.5 percent on /dev/sda1"),
        (t + 70_001, "WARN retry 3 of 5 for job-7f3a"),
        (t + 5_000_000_000, "error: connection reset by peer"),
        (t + 5_000_000_100, "Shutting down"),
    ]
}

pub fn sample_stream() -> Vec<u8> {
    encode_events(SAMPLE_REFERENCE, &sample_events())
}

pub fn encode_events(reference: i64, events: &[(i64, &str)]) -> Vec<u8> {
    let mut encoder = IrEncoder::new(reference);
    encoder.timezone_id("America/Toronto");
    for &(ts, message) in events {
        encoder.add_event(ts, message);
    }
    encoder.encode().expect("fixture encodes")
}

/// A deterministic stream of `n` events, one every 10 ms, for benchmarks.
pub fn synthetic_events(n: usize) -> Vec<(i64, String)> {
    (0..n)
        .map(|i| {
            let ts = SAMPLE_REFERENCE + i64::try_from(i).unwrap_or(i64::MAX) * 10;
            let message = match i % 4 {
                0 => format!("GET /api/items/{i} 200 {}.{} ms", i % 97, i % 10),
                1 => format!("user=u{} logged in from 10.0.{}.{}", i % 1000, i % 256, i % 7),
                2 => format!("cache miss for key session-{i:x}"),
                _ => "heartbeat ok".to_string(),
            };
            (ts, message)
        })
        .collect()
}

/// Byte source that hands out data in a repeating pattern of chunk sizes.
#[derive(Debug)]
pub struct ChunkedSource {
    data: Vec<u8>,
    pos: usize,
    sizes: Vec<usize>,
    next_size: usize,
    reads: usize,
}

impl ChunkedSource {
    /// `sizes` must be non-empty and non-zero.
    pub fn new(data: Vec<u8>, sizes: &[usize]) -> Self {
        assert!(!sizes.is_empty() && sizes.iter().all(|&s| s > 0));
        Self {
            data,
            pos: 0,
            sizes: sizes.to_vec(),
            next_size: 0,
            reads: 0,
        }
    }

    /// Number of `read_more` calls that returned data.
    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl ByteSource for ChunkedSource {
    fn read_more(&mut self, buf: &mut Vec<u8>) -> io::Result<usize> {
        let size = self.sizes[self.next_size % self.sizes.len()];
        self.next_size += 1;
        let end = (self.pos + size).min(self.data.len());
        buf.extend_from_slice(&self.data[self.pos..end]);
        let n = end - self.pos;
        self.pos = end;
        if n > 0 {
            self.reads += 1;
        }
        Ok(n)
    }
}

/// Decode everything a session yields, returning the events and how the
/// scan ended.
pub fn drain<S: ByteSource>(
    session: &mut DecodeSession<S>,
    filter: Option<&QueryFilter>,
) -> Result<(Vec<LogEvent>, NextEvent), DecodeError> {
    let mut events = Vec::new();
    loop {
        match session.decode_next(filter)? {
            NextEvent::Event(event) => events.push(event),
            end => return Ok((events, end)),
        }
    }
}

/// Decode a complete stream without a filter.
pub fn decode_all(source: impl ByteSource) -> Result<Vec<LogEvent>, DecodeError> {
    let mut session = DecodeSession::new(source);
    session.decode_preamble()?;
    drain(&mut session, None).map(|(events, _)| events)
}
