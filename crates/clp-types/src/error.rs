/// Errors raised while building a [`StreamMetadata`](crate::StreamMetadata)
/// from a decoded preamble.
///
/// ```text
/// ┌─────────────────────────────────────────────────────────────┐
/// │ MetadataError                                               │
/// │   ├── UnsupportedEncoding ← eight-byte stream, or reference │
/// │   │                         timestamp that isn't an integer │
/// │   └── MetadataCorrupted   ← required key missing / mistyped │
/// └─────────────────────────────────────────────────────────────┘
/// ```
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MetadataError {
  #[error("unsupported encoding: {0}")]
  UnsupportedEncoding(String),

  #[error("metadata corrupted: {0}")]
  MetadataCorrupted(String),
}

/// Errors raised when a [`QueryFilter`](crate::QueryFilter) is built with
/// parameters that can never match anything.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
  /// The lower time bound is above the upper time bound.
  #[error("time range is empty: begin {begin} > end {end}")]
  InvalidTimeRange { begin: i64, end: i64 },

  /// The early-termination margin is negative.
  #[error("termination margin must not be negative, got {0}")]
  NegativeMargin(i64),
}
