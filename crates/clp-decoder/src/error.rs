use clp_types::MetadataError;
use clp_wire::IrErrorCode;

/// A [`ByteCursor`](crate::ByteCursor) commit that would break the cursor's
/// invariants. These are caller bugs, not stream corruption.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CursorError {
    /// The requested position is behind the current consumed boundary.
    #[error("cannot commit backward: position {requested} is before {current}")]
    Backward { requested: u64, current: u64 },

    /// The requested position is beyond the bytes buffered so far.
    #[error("cannot commit to position {requested}: only {available} bytes buffered")]
    PastEnd { requested: u64, available: u64 },
}

/// Errors that end a decode session.
///
/// Running out of input in the middle of a record, and every other
/// condition the engine can recover from by reading more, is handled
/// internally and never shows up here. End of stream and "no more matches"
/// are normal outcomes reported through
/// [`NextEvent`](crate::NextEvent).
///
/// Error hierarchy:
///
/// ```text
///   DecodeError
///   ├── UnsupportedEncoding   ← eight-byte stream, non-integer reference timestamp
///   ├── MetadataCorrupted     ← preamble JSON invalid, key missing or mistyped
///   ├── IncompleteStream      ← source exhausted with a partial record buffered
///   ├── Codec { code }        ← fatal diagnostic from clp-wire
///   ├── MetadataNotDecoded    ← decode_next called before decode_preamble
///   ├── Poisoned              ← session already failed
///   ├── Cursor(CursorError)   ← cursor invariant violated
///   └── Io(std::io::Error)    ← byte source read failed
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("metadata corrupted: {0}")]
    MetadataCorrupted(String),

    /// The byte source ran dry while `buffered` bytes of an unfinished
    /// record (or preamble) were waiting for the rest.
    #[error("incomplete IR stream: source exhausted with {buffered} unconsumed bytes")]
    IncompleteStream { buffered: usize },

    /// The codec rejected the input. Displays the symbolic name and number,
    /// e.g. `CorruptedIR (3)`.
    #[error("IR stream rejected by decoder: {code}")]
    Codec { code: IrErrorCode },

    #[error("preamble has not been decoded yet")]
    MetadataNotDecoded,

    /// A previous call failed; the buffered state is no longer trustworthy.
    #[error("decode session is unusable after an earlier error")]
    Poisoned,

    #[error(transparent)]
    Cursor(#[from] CursorError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<MetadataError> for DecodeError {
    fn from(err: MetadataError) -> Self {
        match err {
            MetadataError::UnsupportedEncoding(msg) => Self::UnsupportedEncoding(msg),
            MetadataError::MetadataCorrupted(msg) => Self::MetadataCorrupted(msg),
        }
    }
}

impl DecodeError {
    /// Whether the error came from the stream's content (as opposed to I/O
    /// or misuse of the API).
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::MetadataCorrupted(_) | Self::IncompleteStream { .. } | Self::Codec { .. }
        )
    }
}
