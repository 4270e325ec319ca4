use std::sync::Arc;

use clp_types::{FilterVerdict, LogEvent, QueryFilter, StreamMetadata};
use clp_wire::{DecodeStatus, decode_one_record, decode_preamble_header, detect_encoding_width};
use tracing::{debug, trace, warn};

use crate::cursor::ByteCursor;
use crate::error::DecodeError;
use crate::source::ByteSource;

/// Result of a successful [`DecodeSession::decode_next`] call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NextEvent {
  /// A record that passed the filter (or any record, without a filter).
  Event(LogEvent),
  /// The stream is over. Every later call returns this again.
  EndOfStream,
  /// The filter's time range has been passed; no later record can match.
  NoMoreMatches,
}

impl NextEvent {
  pub fn into_event(self) -> Option<LogEvent> {
    match self {
      Self::Event(event) => Some(event),
      Self::EndOfStream | Self::NoMoreMatches => None,
    }
  }
}

/// Lifecycle of a session.
///
/// ```text
///   AwaitingPreamble ──decode_preamble──► Decoding ──EOF──► Finished
///          │                                  │
///          └────────── any fatal error ───────┴──────────► Poisoned
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SessionState {
  AwaitingPreamble,
  Decoding,
  Finished,
  Poisoned,
}

/// Outcome of running one codec function against the cursor with refills.
enum Pulled<T> {
  Decoded { consumed: usize, value: T },
  EndOfStream,
  /// The source is exhausted and the codec still wants more.
  Exhausted,
}

/// Incremental decoder for one IR stream.
///
/// A session owns its input cursor, decodes the preamble once, then hands
/// out records one at a time. It pulls from the [`ByteSource`] only when
/// the buffered bytes don't hold a complete record, so the same stream
/// decodes identically no matter how the source splits it into chunks.
///
/// After any error the session is poisoned and every later call returns
/// [`DecodeError::Poisoned`]; start a new session to retry.
///
/// # Example
///
/// ```rust
/// use clp_decoder::{DecodeSession, NextEvent};
/// use clp_encoder::IrEncoder;
///
/// let bytes = IrEncoder::new(1_000)
///     .add_event(1_000, "started")
///     .add_event(1_250, "listening on port 8080")
///     .encode()
///     .unwrap();
///
/// let mut session = DecodeSession::new(bytes.as_slice());
/// session.decode_preamble().unwrap();
/// while let NextEvent::Event(event) = session.decode_next(None).unwrap() {
///     println!("{event}");
/// }
/// ```
#[derive(Debug)]
pub struct DecodeSession<S> {
  cursor: ByteCursor<S>,
  metadata: Option<Arc<StreamMetadata>>,
  state: SessionState,
}

impl<S: ByteSource> DecodeSession<S> {
  pub fn new(source: S) -> Self {
    Self::from_cursor(ByteCursor::new(source))
  }

  pub fn with_capacity(source: S, capacity: usize) -> Self {
    Self::from_cursor(ByteCursor::with_capacity(source, capacity))
  }

  fn from_cursor(cursor: ByteCursor<S>) -> Self {
    Self {
      cursor,
      metadata: None,
      state: SessionState::AwaitingPreamble,
    }
  }

  /// Metadata decoded from the preamble, once available.
  pub fn metadata(&self) -> Option<&Arc<StreamMetadata>> {
    self.metadata.as_ref()
  }

  /// Number of records decoded so far, including those a filter rejected.
  pub fn decoded_count(&self) -> u64 {
    self.cursor.decoded_count()
  }

  /// Absolute offset of the first byte not yet decoded.
  pub fn position(&self) -> u64 {
    self.cursor.position()
  }

  pub fn is_poisoned(&self) -> bool {
    self.state == SessionState::Poisoned
  }

  pub fn into_source(self) -> S {
    self.cursor.into_source()
  }

  /// Read and validate the stream preamble.
  ///
  /// On success the running timestamp is set to the stream's reference
  /// timestamp. Calling this again after success returns the same metadata
  /// without reading anything.
  ///
  /// # Errors
  ///
  /// - [`DecodeError::UnsupportedEncoding`] for an eight-byte stream. Only
  ///   the magic number has been consumed at that point.
  /// - [`DecodeError::MetadataCorrupted`] if the metadata is not valid JSON
  ///   or lacks a required key.
  /// - [`DecodeError::IncompleteStream`] if the source ends inside the
  ///   preamble.
  /// - [`DecodeError::Codec`] for a magic number or header the codec
  ///   rejects.
  pub fn decode_preamble(&mut self) -> Result<Arc<StreamMetadata>, DecodeError> {
    match self.state {
      SessionState::Poisoned => return Err(DecodeError::Poisoned),
      SessionState::AwaitingPreamble => {}
      SessionState::Decoding | SessionState::Finished => {
        if let Some(metadata) = &self.metadata {
          return Ok(Arc::clone(metadata));
        }
      }
    }

    let result = self.read_preamble();
    self.poison_on_error(result)
  }

  /// Decode records until one is accepted or the stream ends.
  ///
  /// Without a filter the next record is returned. With one, rejected
  /// records are consumed and skipped (they still count towards
  /// [`decoded_count`](Self::decoded_count)), and the first record past the
  /// filter's time range ends the search with [`NextEvent::NoMoreMatches`].
  ///
  /// # Errors
  ///
  /// - [`DecodeError::MetadataNotDecoded`] before
  ///   [`decode_preamble`](Self::decode_preamble) has succeeded. This does
  ///   not poison the session.
  /// - [`DecodeError::IncompleteStream`] if the source ends in the middle of
  ///   a record. A source that ends exactly between records is reported as
  ///   [`NextEvent::EndOfStream`] instead.
  /// - [`DecodeError::Codec`] for malformed record bytes.
  pub fn decode_next(&mut self, filter: Option<&QueryFilter>) -> Result<NextEvent, DecodeError> {
    let metadata = match self.state {
      SessionState::Poisoned => return Err(DecodeError::Poisoned),
      SessionState::AwaitingPreamble => return Err(DecodeError::MetadataNotDecoded),
      SessionState::Finished => return Ok(NextEvent::EndOfStream),
      SessionState::Decoding => match &self.metadata {
        Some(metadata) => Arc::clone(metadata),
        None => return Err(DecodeError::MetadataNotDecoded),
      },
    };

    let result = self.read_next(&metadata, filter);
    self.poison_on_error(result)
  }

  fn poison_on_error<T>(&mut self, result: Result<T, DecodeError>) -> Result<T, DecodeError> {
    if let Err(e) = &result {
      debug!(error = %e, position = self.cursor.position(), "decode session poisoned");
      self.state = SessionState::Poisoned;
    }
    result
  }

  /// Run `decode` on the unconsumed view, refilling until it stops asking
  /// for more input. Nothing is committed here.
  fn pull<T>(&mut self, decode: impl Fn(&[u8]) -> DecodeStatus<T>) -> Result<Pulled<T>, DecodeError> {
    loop {
      match decode(self.cursor.unconsumed_view()) {
        DecodeStatus::Success { consumed, value } => return Ok(Pulled::Decoded { consumed, value }),
        DecodeStatus::EndOfStream => return Ok(Pulled::EndOfStream),
        DecodeStatus::Fatal(code) => return Err(DecodeError::Codec { code }),
        DecodeStatus::NeedMoreInput => {
          if self.cursor.refill()? == 0 {
            return Ok(Pulled::Exhausted);
          }
        }
      }
    }
  }

  fn incomplete(&self) -> DecodeError {
    DecodeError::IncompleteStream {
      buffered: self.cursor.unconsumed_view().len(),
    }
  }

  fn read_preamble(&mut self) -> Result<Arc<StreamMetadata>, DecodeError> {
    let (consumed, width) = match self.pull(detect_encoding_width)? {
      Pulled::Decoded { consumed, value } => (consumed, value),
      Pulled::EndOfStream | Pulled::Exhausted => return Err(self.incomplete()),
    };
    self.cursor.commit(consumed)?;
    debug!(?width, "detected encoding width");
    if !width.is_narrow() {
      return Err(DecodeError::UnsupportedEncoding(
        "eight-byte encoded streams are not supported".to_string(),
      ));
    }

    let (consumed, layout) = match self.pull(decode_preamble_header)? {
      Pulled::Decoded { consumed, value } => (consumed, value),
      Pulled::EndOfStream | Pulled::Exhausted => return Err(self.incomplete()),
    };
    debug!(metadata_len = layout.metadata_len, "located preamble metadata");

    let bytes = layout
      .metadata(self.cursor.unconsumed_view())
      .ok_or_else(|| self.incomplete())?;
    let doc: serde_json::Value =
      serde_json::from_slice(bytes).map_err(|e| DecodeError::MetadataCorrupted(e.to_string()))?;
    let metadata = Arc::new(StreamMetadata::from_json(&doc, width)?);
    self.cursor.commit(consumed)?;

    debug!(
      reference_timestamp = metadata.reference_timestamp(),
      timezone = metadata.timezone_id(),
      version = metadata.version(),
      "decoded preamble"
    );
    self.cursor.set_timestamp(metadata.reference_timestamp());
    self.metadata = Some(Arc::clone(&metadata));
    self.state = SessionState::Decoding;
    Ok(metadata)
  }

  fn read_next(
    &mut self,
    metadata: &Arc<StreamMetadata>,
    filter: Option<&QueryFilter>,
  ) -> Result<NextEvent, DecodeError> {
    loop {
      let (consumed, record) = match self.pull(decode_one_record)? {
        Pulled::Decoded { consumed, value } => (consumed, value),
        Pulled::EndOfStream => {
          debug!(decoded = self.cursor.decoded_count(), "reached end-of-stream marker");
          self.state = SessionState::Finished;
          return Ok(NextEvent::EndOfStream);
        }
        Pulled::Exhausted if self.cursor.unconsumed_view().is_empty() => {
          warn!(
            decoded = self.cursor.decoded_count(),
            "stream ended between records without an end-of-stream marker"
          );
          self.state = SessionState::Finished;
          return Ok(NextEvent::EndOfStream);
        }
        Pulled::Exhausted => return Err(self.incomplete()),
      };

      let timestamp = self.cursor.advance_timestamp(record.timestamp_delta);
      self.cursor.commit(consumed)?;
      let index = self.cursor.next_index();

      let Some(filter) = filter else {
        trace!(index, timestamp, "decoded record");
        return Ok(NextEvent::Event(LogEvent::new(
          record.message,
          timestamp,
          index,
          Arc::clone(metadata),
        )));
      };

      match filter.evaluate(timestamp, &record.message) {
        FilterVerdict::StopScanning => {
          trace!(index, timestamp, "record past the filter's time range");
          return Ok(NextEvent::NoMoreMatches);
        }
        FilterVerdict::Reject => trace!(index, timestamp, "record rejected by filter"),
        FilterVerdict::Accept { pattern } => {
          trace!(index, timestamp, ?pattern, "record accepted by filter");
          return Ok(NextEvent::Event(LogEvent::new(
            record.message,
            timestamp,
            index,
            Arc::clone(metadata),
          )));
        }
      }
    }
  }
}
