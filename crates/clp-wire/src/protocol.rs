// Every byte value the four-byte IR format puts on the wire lives here, so the
// encoder and the decoder can't drift apart. Tags are grouped by the first
// nibble: 0x1_ for variables, 0x2_ for logtypes, 0x3_ for timestamps.

/// Magic number opening a four-byte encoded IR stream.
pub const FOUR_BYTE_ENCODING_MAGIC: [u8; 4] = [0xFD, 0x2F, 0xB5, 0x29];

/// Magic number opening an eight-byte encoded IR stream.
///
/// Recognised so it can be rejected with a precise error; decoding the
/// eight-byte variant is not supported.
pub const EIGHT_BYTE_ENCODING_MAGIC: [u8; 4] = [0xFD, 0x2F, 0xB5, 0x30];

/// Length of either magic number.
pub const MAGIC_NUMBER_LEN: usize = 4;

/// Preamble metadata encoding tags.
pub mod metadata {
    /// The metadata block is a JSON object.
    pub const ENCODING_JSON: u8 = 0x01;

    /// Metadata length follows as a single unsigned byte.
    pub const LENGTH_UBYTE: u8 = 0x11;

    /// Metadata length follows as a big-endian `u16`.
    pub const LENGTH_USHORT: u8 = 0x12;

    /// Protocol version written by this implementation.
    pub const VERSION_VALUE: &str = "v0.0.0";

    pub const VERSION_KEY: &str = "VERSION";
    pub const REFERENCE_TIMESTAMP_KEY: &str = "REFERENCE_TIMESTAMP";
    pub const TIMESTAMP_PATTERN_KEY: &str = "TIMESTAMP_PATTERN";
    pub const TIMESTAMP_PATTERN_SYNTAX_KEY: &str = "TIMESTAMP_PATTERN_SYNTAX";
    pub const TIMEZONE_ID_KEY: &str = "TZ_ID";
}

/// Record payload tags.
pub mod payload {
    pub const VAR_STR_LEN_UBYTE: u8 = 0x11;
    pub const VAR_STR_LEN_USHORT: u8 = 0x12;
    pub const VAR_STR_LEN_INT: u8 = 0x13;

    /// A four-byte encoded variable (integer or float) follows.
    pub const VAR_FOUR_BYTE_ENCODING: u8 = 0x18;

    pub const LOGTYPE_STR_LEN_UBYTE: u8 = 0x21;
    pub const LOGTYPE_STR_LEN_USHORT: u8 = 0x22;
    pub const LOGTYPE_STR_LEN_INT: u8 = 0x23;

    pub const TIMESTAMP_DELTA_BYTE: u8 = 0x31;
    pub const TIMESTAMP_DELTA_SHORT: u8 = 0x32;
    pub const TIMESTAMP_DELTA_INT: u8 = 0x33;
    pub const TIMESTAMP_DELTA_LONG: u8 = 0x34;

    /// End of the record stream.
    pub const EOF: u8 = 0x00;
}

/// Placeholder bytes embedded in a logtype where a variable was removed.
pub mod placeholder {
    pub const INTEGER: u8 = 0x11;
    pub const DICTIONARY: u8 = 0x12;
    pub const FLOAT: u8 = 0x13;

    /// Escapes a literal placeholder byte (or a literal escape) in a logtype.
    pub const ESCAPE: u8 = b'\\';

    /// Whether `byte` must be escaped when it appears literally in a logtype.
    pub fn needs_escape(byte: u8) -> bool {
        matches!(byte, INTEGER | DICTIONARY | FLOAT | ESCAPE)
    }
}

/// Width of the encoded variables and timestamps in a stream, announced by
/// the magic number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EncodingWidth {
    /// Four-byte variables with delta-encoded timestamps.
    FourByte,
    /// Eight-byte variables with absolute timestamps.
    EightByte,
}

impl EncodingWidth {
    /// Whether this is the narrow (four-byte) variant.
    pub fn is_narrow(self) -> bool {
        self == Self::FourByte
    }
}

/// Diagnostic codes reported by the codec for unrecoverable input.
///
/// The numeric values follow the original CLP error-code table so they can be
/// correlated with other tooling; `Success`, `Incomplete`, and `Eof` are not
/// listed because [`DecodeStatus`](crate::DecodeStatus) carries them as
/// variants of their own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IrErrorCode {
    /// Input was structurally valid but could not be turned into a value
    /// (e.g. a message that is not UTF-8).
    DecodeError,
    /// Unknown tag, bad placeholder, or otherwise malformed record bytes.
    CorruptedIr,
    /// The preamble's metadata block is malformed or of an unknown encoding.
    CorruptedMetadata,
    /// The magic number is not one this codec recognises.
    UnsupportedVersion,
}

impl IrErrorCode {
    /// Numeric code for diagnostics.
    pub fn code(self) -> u8 {
        match self {
            Self::DecodeError => 1,
            Self::CorruptedIr => 3,
            Self::CorruptedMetadata => 4,
            Self::UnsupportedVersion => 6,
        }
    }

    /// Symbolic name for diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::DecodeError => "DecodeError",
            Self::CorruptedIr => "CorruptedIR",
            Self::CorruptedMetadata => "CorruptedMetadata",
            Self::UnsupportedVersion => "UnsupportedVersion",
        }
    }
}

impl std::fmt::Display for IrErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}
