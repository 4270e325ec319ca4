use std::io::Write;

use crate::error::WireError;
use crate::protocol::{
    metadata, EncodingWidth, IrErrorCode, EIGHT_BYTE_ENCODING_MAGIC, FOUR_BYTE_ENCODING_MAGIC,
    MAGIC_NUMBER_LEN,
};
use crate::status::{DecodeStatus, Stop, ViewReader};

/// Largest metadata block the preamble's length field can describe.
pub const MAX_METADATA_LEN: usize = u16::MAX as usize;

/// Location of the metadata block inside the view passed to
/// [`decode_preamble_header`].
///
/// ```text
/// ┌──────────┬──────────────┬───────────────────────────────┐
/// │ 1 byte   │ 2 or 3 bytes │ metadata_len bytes            │
/// │ encoding │ length tag   │ metadata (JSON)               │
/// └──────────┴──────────────┴───────────────────────────────┘
///                           ^ metadata_pos
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PreambleLayout {
    /// Metadata encoding tag; only [`metadata::ENCODING_JSON`] is defined.
    pub encoding: u8,
    /// Offset of the first metadata byte, relative to the decoded view.
    pub metadata_pos: usize,
    /// Length of the metadata block in bytes.
    pub metadata_len: usize,
}

impl PreambleLayout {
    /// Slice the metadata block out of the same view that was decoded.
    ///
    /// Returns `None` if `view` is not the view the layout was decoded from
    /// (too short to contain the block).
    pub fn metadata<'a>(&self, view: &'a [u8]) -> Option<&'a [u8]> {
        view.get(self.metadata_pos..self.metadata_pos + self.metadata_len)
    }
}

/// Identify the encoding width from the magic number at the start of `buf`.
///
/// Consumes exactly [`MAGIC_NUMBER_LEN`] bytes on success. An unrecognised
/// magic number is reported as [`IrErrorCode::CorruptedIr`]: the stream is not
/// an IR stream at all.
pub fn detect_encoding_width(buf: &[u8]) -> DecodeStatus<EncodingWidth> {
    let Some(magic) = buf.get(..MAGIC_NUMBER_LEN) else {
        return DecodeStatus::NeedMoreInput;
    };

    let width = if magic == FOUR_BYTE_ENCODING_MAGIC {
        EncodingWidth::FourByte
    } else if magic == EIGHT_BYTE_ENCODING_MAGIC {
        EncodingWidth::EightByte
    } else {
        return DecodeStatus::Fatal(IrErrorCode::CorruptedIr);
    };

    DecodeStatus::Success {
        consumed: MAGIC_NUMBER_LEN,
        value: width,
    }
}

/// Decode the preamble header that follows the magic number.
///
/// Succeeds only once the whole metadata block is inside `buf`; `consumed`
/// then covers the header *and* the metadata, and the returned
/// [`PreambleLayout`] says where the metadata sits within `buf`.
pub fn decode_preamble_header(buf: &[u8]) -> DecodeStatus<PreambleLayout> {
    match read_preamble_header(buf) {
        Ok((layout, consumed)) => DecodeStatus::Success {
            consumed,
            value: layout,
        },
        Err(stop) => stop.into(),
    }
}

fn read_preamble_header(buf: &[u8]) -> Result<(PreambleLayout, usize), Stop> {
    let mut reader = ViewReader::new(buf);

    let encoding = reader.read_u8()?;
    if encoding != metadata::ENCODING_JSON {
        return Err(Stop::Fatal(IrErrorCode::CorruptedMetadata));
    }

    let metadata_len = match reader.read_u8()? {
        metadata::LENGTH_UBYTE => usize::from(reader.read_u8()?),
        metadata::LENGTH_USHORT => usize::from(reader.read_u16()?),
        _ => return Err(Stop::Fatal(IrErrorCode::CorruptedMetadata)),
    };

    let metadata_pos = reader.pos();
    reader.read_bytes(metadata_len)?;

    Ok((
        PreambleLayout {
            encoding,
            metadata_pos,
            metadata_len,
        },
        reader.pos(),
    ))
}

/// Write a four-byte encoding preamble: magic number, metadata header, and
/// the metadata JSON itself.
///
/// # Returns
///
/// Total number of bytes written.
///
/// # Errors
///
/// - [`WireError::MetadataTooLarge`] if `metadata_json` exceeds
///   [`MAX_METADATA_LEN`].
/// - [`WireError::Io`] if the writer fails.
pub fn write_preamble(w: &mut impl Write, metadata_json: &[u8]) -> Result<usize, WireError> {
    let len = metadata_json.len();
    if len > MAX_METADATA_LEN {
        return Err(WireError::MetadataTooLarge {
            len,
            limit: MAX_METADATA_LEN,
        });
    }

    w.write_all(&FOUR_BYTE_ENCODING_MAGIC)?;
    w.write_all(&[metadata::ENCODING_JSON])?;
    let mut written = MAGIC_NUMBER_LEN + 1;

    if let Ok(short) = u8::try_from(len) {
        w.write_all(&[metadata::LENGTH_UBYTE, short])?;
        written += 2;
    } else {
        // Checked against MAX_METADATA_LEN above
        #[allow(clippy::cast_possible_truncation)]
        let wide = len as u16;
        w.write_all(&[metadata::LENGTH_USHORT])?;
        w.write_all(&wide.to_be_bytes())?;
        written += 3;
    }

    w.write_all(metadata_json)?;
    Ok(written + len)
}
