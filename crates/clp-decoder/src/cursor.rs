use std::io;

use tracing::trace;

use crate::error::CursorError;
use crate::source::ByteSource;

/// Growable input buffer with a consumed boundary, plus the running
/// per-stream decode state (timestamp baseline and record counter).
///
/// ```text
///   stream offset ─► ┌──────────────┬─────────────────────┐
///                    │ consumed     │ unconsumed view     │
///                    └──────────────┴─────────────────────┘
///                    0          consumed            buf.len()
/// ```
///
/// Bytes before the boundary are dropped on the next refill, so the
/// buffer only ever holds one partially decoded record plus whatever the
/// source handed over after it. Positions reported by
/// [`position`](Self::position) are absolute stream offsets and stay valid
/// across refills.
#[derive(Debug)]
pub struct ByteCursor<S> {
  source: S,
  buf: Vec<u8>,
  consumed: usize,
  /// Stream offset of `buf[0]`.
  base_offset: u64,
  current_timestamp: i64,
  decoded_count: u64,
}

impl<S: ByteSource> ByteCursor<S> {
  pub fn new(source: S) -> Self {
    Self::with_capacity(source, 0)
  }

  pub fn with_capacity(source: S, capacity: usize) -> Self {
    Self {
      source,
      buf: Vec::with_capacity(capacity),
      consumed: 0,
      base_offset: 0,
      current_timestamp: 0,
      decoded_count: 0,
    }
  }

  /// Bytes buffered but not yet committed.
  pub fn unconsumed_view(&self) -> &[u8] {
    &self.buf[self.consumed..]
  }

  /// Pull more bytes from the source.
  ///
  /// Already-consumed bytes are discarded first. The unconsumed view keeps
  /// its content and gains the new bytes at the end. Returns the number of
  /// bytes added; zero means the source is exhausted.
  pub fn refill(&mut self) -> io::Result<usize> {
    if self.consumed > 0 {
      self.buf.drain(..self.consumed);
      self.base_offset += self.consumed as u64;
      self.consumed = 0;
    }
    let n = self.source.read_more(&mut self.buf)?;
    trace!(added = n, buffered = self.buf.len(), "refilled input buffer");
    Ok(n)
  }

  /// Absolute stream offset of the consumed boundary.
  pub fn position(&self) -> u64 {
    self.base_offset + self.consumed as u64
  }

  /// Stream offset one past the last buffered byte.
  pub fn buffered_end(&self) -> u64 {
    self.base_offset + self.buf.len() as u64
  }

  /// Move the consumed boundary to the absolute stream offset `pos`.
  ///
  /// # Errors
  ///
  /// [`CursorError::Backward`] if `pos` is before the current boundary,
  /// [`CursorError::PastEnd`] if it is past the buffered bytes. The cursor
  /// is left unchanged in both cases.
  pub fn commit_to(&mut self, pos: u64) -> Result<(), CursorError> {
    let current = self.position();
    if pos < current {
      return Err(CursorError::Backward {
        requested: pos,
        current,
      });
    }
    let available = self.buffered_end();
    if pos > available {
      return Err(CursorError::PastEnd {
        requested: pos,
        available,
      });
    }
    self.consumed = usize::try_from(pos - self.base_offset).map_err(|_| CursorError::PastEnd {
      requested: pos,
      available,
    })?;
    Ok(())
  }

  /// Mark the first `n` bytes of the unconsumed view as consumed.
  ///
  /// # Errors
  ///
  /// [`CursorError::PastEnd`] if `n` exceeds the unconsumed view.
  pub fn commit(&mut self, n: usize) -> Result<(), CursorError> {
    self.commit_to(self.position().saturating_add(n as u64))
  }

  pub fn current_timestamp(&self) -> i64 {
    self.current_timestamp
  }

  /// Reset the timestamp baseline, e.g. to the preamble's reference
  /// timestamp.
  pub fn set_timestamp(&mut self, ts: i64) {
    self.current_timestamp = ts;
  }

  /// Apply a record's delta to the running timestamp and return the new
  /// absolute value. Saturates instead of wrapping.
  pub fn advance_timestamp(&mut self, delta: i64) -> i64 {
    self.current_timestamp = self.current_timestamp.saturating_add(delta);
    self.current_timestamp
  }

  /// Hand out the next record index (zero-based).
  pub fn next_index(&mut self) -> u64 {
    let idx = self.decoded_count;
    self.decoded_count += 1;
    idx
  }

  /// Number of records decoded so far, filtered or not.
  pub fn decoded_count(&self) -> u64 {
    self.decoded_count
  }

  pub fn source(&self) -> &S {
    &self.source
  }

  pub fn into_source(self) -> S {
    self.source
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::source::ReaderSource;

  fn cursor(data: &'static [u8], chunk: usize) -> ByteCursor<ReaderSource<&'static [u8]>> {
    ByteCursor::new(ReaderSource::with_chunk_size(data, chunk))
  }

  #[test]
  fn starts_empty() {
    let c = cursor(b"abc", 2);
    assert!(c.unconsumed_view().is_empty());
    assert_eq!(c.position(), 0);
    assert_eq!(c.decoded_count(), 0);
  }

  #[test]
  fn refill_appends_to_unconsumed_view() {
    let mut c = cursor(b"abcdef", 2);
    assert_eq!(c.refill().unwrap(), 2);
    assert_eq!(c.refill().unwrap(), 2);
    assert_eq!(c.unconsumed_view(), b"abcd");
  }

  #[test]
  fn refill_compacts_consumed_bytes() {
    let mut c = cursor(b"abcdef", 3);
    c.refill().unwrap();
    c.commit(2).unwrap();
    assert_eq!(c.unconsumed_view(), b"c");
    c.refill().unwrap();
    assert_eq!(c.unconsumed_view(), b"cdef");
    assert_eq!(c.position(), 2);
    assert_eq!(c.buffered_end(), 6);
  }

  #[test]
  fn exhausted_source_returns_zero() {
    let mut c = cursor(b"a", 8);
    assert_eq!(c.refill().unwrap(), 1);
    assert_eq!(c.refill().unwrap(), 0);
    assert_eq!(c.unconsumed_view(), b"a");
  }

  #[test]
  fn commit_past_end_is_rejected() {
    let mut c = cursor(b"abc", 8);
    c.refill().unwrap();
    assert_eq!(
      c.commit(4),
      Err(CursorError::PastEnd {
        requested: 4,
        available: 3
      })
    );
    assert_eq!(c.position(), 0);
  }

  #[test]
  fn commit_backward_is_rejected() {
    let mut c = cursor(b"abcdef", 8);
    c.refill().unwrap();
    c.commit_to(4).unwrap();
    assert_eq!(
      c.commit_to(3),
      Err(CursorError::Backward {
        requested: 3,
        current: 4
      })
    );
    c.commit_to(4).unwrap();
    assert_eq!(c.unconsumed_view(), b"ef");
  }

  #[test]
  fn absolute_positions_survive_compaction() {
    let mut c = cursor(b"abcdefgh", 4);
    c.refill().unwrap();
    c.commit_to(3).unwrap();
    c.refill().unwrap();
    c.commit_to(6).unwrap();
    assert_eq!(c.unconsumed_view(), b"gh");
  }

  #[test]
  fn timestamp_and_index_bookkeeping() {
    let mut c = cursor(b"", 1);
    c.set_timestamp(1000);
    assert_eq!(c.advance_timestamp(5), 1005);
    assert_eq!(c.advance_timestamp(-10), 995);
    assert_eq!(c.current_timestamp(), 995);
    assert_eq!(c.next_index(), 0);
    assert_eq!(c.next_index(), 1);
    assert_eq!(c.decoded_count(), 2);
  }

  #[test]
  fn timestamp_saturates() {
    let mut c = cursor(b"", 1);
    c.set_timestamp(i64::MAX - 1);
    assert_eq!(c.advance_timestamp(10), i64::MAX);
  }
}
