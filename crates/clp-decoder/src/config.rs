/// Configuration for [`IrStreamReader`](crate::IrStreamReader).
///
/// ```text
/// ┌──────────────────┬──────────────────────────────────────────────────┐
/// │ Field            │ Purpose                                          │
/// ├──────────────────┼──────────────────────────────────────────────────┤
/// │ read_chunk_size  │ Bytes requested from the source per refill       │
/// │ initial_capacity │ Input buffer capacity reserved up front          │
/// │ compression      │ Whether the input is zstd-wrapped                │
/// └──────────────────┴──────────────────────────────────────────────────┘
/// ```
///
/// The buffer grows past `initial_capacity` if a single record is larger,
/// so the capacity only affects how often it reallocates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Bytes requested from the underlying reader per refill.
    pub read_chunk_size: usize,

    /// Initial capacity of the input buffer.
    pub initial_capacity: usize,

    /// How to treat a zstd frame around the IR stream.
    pub compression: Compression,
}

impl Default for ReaderConfig {
    /// 64 KiB reads into a 64 KiB buffer, with zstd auto-detection.
    fn default() -> Self {
        Self {
            read_chunk_size: 64 * 1024,
            initial_capacity: 64 * 1024,
            compression: Compression::Auto,
        }
    }
}

/// Compression handling for stream input.
///
/// ```text
/// ┌──────┬─────────────────────────────────────────────────────────────┐
/// │ Mode │ Behavior                                                    │
/// ├──────┼─────────────────────────────────────────────────────────────┤
/// │ Auto │ Decompress if the input starts with the zstd frame magic    │
/// │ None │ Read the input as a raw IR stream                           │
/// │ Zstd │ Always decompress                                           │
/// └──────┴─────────────────────────────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Compression {
    #[default]
    Auto,
    None,
    Zstd,
}
