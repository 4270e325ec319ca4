use clp_wire::WireError;

/// Errors that can occur while producing an IR stream.
///
/// Error hierarchy:
///
/// ```text
///   EncodeError
///   ├── PreambleMissing       ← write_event before write_preamble
///   ├── PreambleAlreadyWritten← write_preamble called twice
///   ├── TimestampOverflow     ← delta between two events doesn't fit in i64
///   ├── Wire(WireError)       ← metadata or message too large for the format
///   └── Io(std::io::Error)    ← from the underlying writer or zstd
/// ```
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("the preamble must be written before any event")]
    PreambleMissing,

    #[error("the preamble has already been written")]
    PreambleAlreadyWritten,

    /// Timestamps are stored as deltas from the previous event; this one is
    /// too far from its predecessor to be represented.
    #[error("timestamp {timestamp} is too far from the previous timestamp {previous}")]
    TimestampOverflow { previous: i64, timestamp: i64 },

    #[error(transparent)]
    Wire(#[from] WireError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
