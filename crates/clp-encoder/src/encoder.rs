use std::io::Cursor;

use clp_types::StreamMetadata;
use tracing::debug;

use crate::error::EncodeError;
use crate::writer::IrWriter;

/// Default zstd compression level for [`IrEncoder::compress_stream`].
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 3;

/// Timestamp pattern recorded in the preamble when none is set.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3";

/// Timezone recorded in the preamble when none is set.
pub const DEFAULT_TIMEZONE_ID: &str = "UTC";

/// Builds a complete four-byte IR stream in memory.
///
/// Events are collected with [`add_event`](Self::add_event) and serialized
/// in insertion order by [`encode`](Self::encode). For streams too large to
/// hold in memory, write through an [`IrWriter`] instead.
///
/// # Usage
///
/// ```rust
/// use clp_encoder::IrEncoder;
///
/// let bytes = IrEncoder::new(1_700_000_000_000)
///     .timezone_id("America/Toronto")
///     .add_event(1_700_000_000_000, "Starting server on port 8080")
///     .add_event(1_700_000_000_250, "Connected to db=primary in 12.5 ms")
///     .encode()
///     .unwrap();
/// assert_eq!(&bytes[..4], &[0xFD, 0x2F, 0xB5, 0x29]);
/// ```
///
/// # Output layout
///
/// ```text
/// ┌──────────────┬──────────────────────────────────────────┐
/// │ [4 bytes]    │ Magic number (four-byte encoding)        │
/// │ [N bytes]    │ Preamble: encoding, length, JSON         │
/// │ [N bytes]    │ Record 0 (vars, logtype, ts delta)       │
/// │ ...          │                                          │
/// │ [1 byte]     │ End-of-stream marker                     │
/// └──────────────┴──────────────────────────────────────────┘
/// ```
///
/// With [`compress_stream`](Self::compress_stream) the whole layout above is
/// wrapped in a single zstd frame.
pub struct IrEncoder {
    reference_timestamp: i64,
    timestamp_format: String,
    timezone_id: String,
    events: Vec<PendingEvent>,
    compress: bool,
}

struct PendingEvent {
    timestamp: i64,
    message: String,
}

impl IrEncoder {
    /// Create an encoder whose timestamp deltas start from
    /// `reference_timestamp` (epoch milliseconds).
    #[must_use]
    pub fn new(reference_timestamp: i64) -> Self {
        Self {
            reference_timestamp,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            timezone_id: DEFAULT_TIMEZONE_ID.to_string(),
            events: Vec::new(),
            compress: false,
        }
    }

    pub fn timestamp_format(&mut self, format: impl Into<String>) -> &mut Self {
        self.timestamp_format = format.into();
        self
    }

    pub fn timezone_id(&mut self, timezone_id: impl Into<String>) -> &mut Self {
        self.timezone_id = timezone_id.into();
        self
    }

    pub fn add_event(&mut self, timestamp: i64, message: impl Into<String>) -> &mut Self {
        self.events.push(PendingEvent {
            timestamp,
            message: message.into(),
        });
        self
    }

    /// Wrap the encoded stream in a zstd frame.
    pub fn compress_stream(&mut self) -> &mut Self {
        self.compress = true;
        self
    }

    /// The metadata the preamble will carry.
    pub fn metadata(&self) -> StreamMetadata {
        StreamMetadata::new(
            self.reference_timestamp,
            self.timestamp_format.as_str(),
            self.timezone_id.as_str(),
        )
    }

    /// Serialize the preamble, every event, and the end-of-stream marker.
    ///
    /// An encoder with no events still produces a valid, empty stream.
    ///
    /// # Errors
    ///
    /// Any [`EncodeError`] raised by [`IrWriter`], or an I/O error from
    /// zstd when compressing.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let mut writer = IrWriter::new(Vec::new());
        writer.write_preamble(&self.metadata())?;
        for event in &self.events {
            writer.write_event(event.timestamp, &event.message)?;
        }
        let raw = writer.finish()?;

        if !self.compress {
            return Ok(raw);
        }
        let compressed = zstd::encode_all(Cursor::new(&raw), DEFAULT_COMPRESSION_LEVEL)?;
        debug!(raw = raw.len(), compressed = compressed.len(), "compressed IR stream");
        Ok(compressed)
    }
}
