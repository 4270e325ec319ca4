use std::io::Write;

use clp_types::StreamMetadata;
use clp_wire::preamble::write_preamble;
use clp_wire::protocol::metadata::{
    REFERENCE_TIMESTAMP_KEY, TIMESTAMP_PATTERN_KEY, TIMESTAMP_PATTERN_SYNTAX_KEY, TIMEZONE_ID_KEY,
    VERSION_KEY, VERSION_VALUE,
};
use clp_wire::record::{write_end_of_stream, write_message, write_timestamp_delta};
use serde_json::json;
use tracing::debug;

use crate::error::EncodeError;

/// Streaming IR serializer.
///
/// Writes the preamble, then one record per [`write_event`](Self::write_event)
/// call, straight to the underlying writer. Nothing is buffered beyond what
/// `W` itself buffers, so an `IrWriter` can encode arbitrarily long streams.
///
/// ```text
///   write_preamble ──► write_event* ──► finish
/// ```
///
/// Each record stores its timestamp as a delta from the previous one (the
/// reference timestamp for the first record).
pub struct IrWriter<W: Write> {
    inner: W,
    last_timestamp: Option<i64>,
    bytes_written: usize,
    events_written: u64,
}

impl<W: Write> IrWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            last_timestamp: None,
            bytes_written: 0,
            events_written: 0,
        }
    }

    /// Write the magic number and the metadata block.
    ///
    /// # Errors
    ///
    /// - [`EncodeError::PreambleAlreadyWritten`] on a second call.
    /// - [`EncodeError::Wire`] if the metadata JSON is over 64 KiB.
    /// - [`EncodeError::Io`] if the writer fails.
    pub fn write_preamble(&mut self, metadata: &StreamMetadata) -> Result<usize, EncodeError> {
        if self.last_timestamp.is_some() {
            return Err(EncodeError::PreambleAlreadyWritten);
        }

        let json = metadata_json(metadata);
        let n = write_preamble(&mut self.inner, json.as_bytes())?;
        debug!(metadata_len = json.len(), "wrote preamble");

        self.last_timestamp = Some(metadata.reference_timestamp());
        self.bytes_written += n;
        Ok(n)
    }

    /// Encode one log event.
    ///
    /// # Errors
    ///
    /// - [`EncodeError::PreambleMissing`] before
    ///   [`write_preamble`](Self::write_preamble).
    /// - [`EncodeError::TimestampOverflow`] if the delta to the previous
    ///   event overflows.
    /// - [`EncodeError::Wire`] / [`EncodeError::Io`] from serialization.
    pub fn write_event(&mut self, timestamp: i64, message: &str) -> Result<usize, EncodeError> {
        let previous = self.last_timestamp.ok_or(EncodeError::PreambleMissing)?;
        let delta = timestamp
            .checked_sub(previous)
            .ok_or(EncodeError::TimestampOverflow {
                previous,
                timestamp,
            })?;

        let n = write_message(&mut self.inner, message)? + write_timestamp_delta(&mut self.inner, delta)?;

        self.last_timestamp = Some(timestamp);
        self.bytes_written += n;
        self.events_written += 1;
        Ok(n)
    }

    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    pub fn events_written(&self) -> u64 {
        self.events_written
    }

    /// Write the end-of-stream marker, flush, and return the writer.
    ///
    /// # Errors
    ///
    /// [`EncodeError::PreambleMissing`] if no preamble was written, or any
    /// I/O error.
    pub fn finish(mut self) -> Result<W, EncodeError> {
        if self.last_timestamp.is_none() {
            return Err(EncodeError::PreambleMissing);
        }
        self.bytes_written += write_end_of_stream(&mut self.inner)?;
        self.inner.flush()?;
        debug!(
            events = self.events_written,
            bytes = self.bytes_written,
            "finished IR stream"
        );
        Ok(self.inner)
    }
}

/// Render the preamble's metadata document.
pub fn metadata_json(metadata: &StreamMetadata) -> String {
    json!({
        VERSION_KEY: metadata.version().unwrap_or(VERSION_VALUE),
        REFERENCE_TIMESTAMP_KEY: metadata.reference_timestamp().to_string(),
        TIMESTAMP_PATTERN_KEY: metadata.timestamp_format(),
        TIMESTAMP_PATTERN_SYNTAX_KEY: "",
        TIMEZONE_ID_KEY: metadata.timezone_id(),
    })
    .to_string()
}
