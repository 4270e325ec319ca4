/// Errors raised while *writing* IR bytes.
///
/// Decoding never produces a `WireError`: decode outcomes are reported through
/// [`DecodeStatus`](crate::DecodeStatus) so that "not enough bytes yet" can be
/// told apart from genuinely broken input without string matching.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// The metadata JSON does not fit the preamble's `u16` length field.
    #[error("metadata block is {len} bytes, limit is {limit}")]
    MetadataTooLarge { len: usize, limit: usize },

    /// A logtype or dictionary variable does not fit the `i32` length field.
    #[error("{what} is {len} bytes, limit is {limit}")]
    LengthOverflow {
        what: &'static str,
        len: usize,
        limit: usize,
    },

    /// I/O error during write.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
