use std::io::Write;

use crate::encoded_var::{decode_float_var, decode_integer_var, encode_float_var, encode_integer_var};
use crate::error::WireError;
use crate::protocol::{payload, placeholder, IrErrorCode};
use crate::status::{DecodeStatus, Stop, ViewReader};

/// A record as it comes off the wire: the reconstructed message text and the
/// timestamp delta relative to the previous record (or the stream's reference
/// timestamp for the first one).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedRecord {
    pub message: String,
    pub timestamp_delta: i64,
}

/// Record layout on the wire:
///
/// ```text
/// ┌────────────────────────────────────────────────────────────┐
/// │ var*      0x18 i32            encoded integer / float      │
/// │           0x11|0x12|0x13 len  dictionary variable bytes    │
/// │ logtype   0x21|0x22|0x23 len  text with placeholders       │
/// │ ts_delta  0x31|0x32|0x33|0x34 signed big-endian delta      │
/// └────────────────────────────────────────────────────────────┘
/// ```
///
/// A record cannot start with `0x00`; that byte marks the end of the stream.
///
/// Returns [`DecodeStatus::NeedMoreInput`] whenever the record is cut short,
/// so a streaming caller can refill and call again with a longer view that
/// starts at the same byte.
pub fn decode_one_record(buf: &[u8]) -> DecodeStatus<DecodedRecord> {
    match buf.first() {
        None => return DecodeStatus::NeedMoreInput,
        Some(&payload::EOF) => return DecodeStatus::EndOfStream,
        Some(_) => {}
    }

    match read_record(buf) {
        Ok((record, consumed)) => DecodeStatus::Success {
            consumed,
            value: record,
        },
        Err(stop) => stop.into(),
    }
}

const CORRUPTED: Stop = Stop::Fatal(IrErrorCode::CorruptedIr);

fn read_record(buf: &[u8]) -> Result<(DecodedRecord, usize), Stop> {
    let mut reader = ViewReader::new(buf);
    let mut encoded_vars = Vec::new();
    let mut dict_vars = Vec::new();

    let logtype = loop {
        match reader.read_u8()? {
            payload::VAR_FOUR_BYTE_ENCODING => encoded_vars.push(reader.read_i32()?),
            payload::VAR_STR_LEN_UBYTE => {
                let len = usize::from(reader.read_u8()?);
                dict_vars.push(reader.read_bytes(len)?);
            }
            payload::VAR_STR_LEN_USHORT => {
                let len = usize::from(reader.read_u16()?);
                dict_vars.push(reader.read_bytes(len)?);
            }
            payload::VAR_STR_LEN_INT => {
                let len = usize::try_from(reader.read_i32()?).map_err(|_| CORRUPTED)?;
                dict_vars.push(reader.read_bytes(len)?);
            }
            payload::LOGTYPE_STR_LEN_UBYTE => {
                let len = usize::from(reader.read_u8()?);
                break reader.read_bytes(len)?;
            }
            payload::LOGTYPE_STR_LEN_USHORT => {
                let len = usize::from(reader.read_u16()?);
                break reader.read_bytes(len)?;
            }
            payload::LOGTYPE_STR_LEN_INT => {
                let len = usize::try_from(reader.read_i32()?).map_err(|_| CORRUPTED)?;
                break reader.read_bytes(len)?;
            }
            _ => return Err(CORRUPTED),
        }
    };

    let timestamp_delta = match reader.read_u8()? {
        payload::TIMESTAMP_DELTA_BYTE => i64::from(reader.read_i8()?),
        payload::TIMESTAMP_DELTA_SHORT => i64::from(reader.read_i16()?),
        payload::TIMESTAMP_DELTA_INT => i64::from(reader.read_i32()?),
        payload::TIMESTAMP_DELTA_LONG => reader.read_i64()?,
        _ => return Err(CORRUPTED),
    };

    let message = expand_logtype(logtype, &encoded_vars, &dict_vars)?;

    Ok((
        DecodedRecord {
            message,
            timestamp_delta,
        },
        reader.pos(),
    ))
}

/// Substitute variables back into their placeholders.
///
/// Every variable must be used exactly once, in order.
fn expand_logtype(logtype: &[u8], encoded: &[i32], dict: &[&[u8]]) -> Result<String, Stop> {
    let dict_len: usize = dict.iter().map(|v| v.len()).sum();
    let mut out = Vec::with_capacity(logtype.len() + dict_len + encoded.len() * 11);
    let mut encoded = encoded.iter();
    let mut dict = dict.iter();
    let mut bytes = logtype.iter();

    while let Some(&byte) = bytes.next() {
        match byte {
            placeholder::ESCAPE => {
                let &literal = bytes.next().ok_or(CORRUPTED)?;
                out.push(literal);
            }
            placeholder::INTEGER => {
                let &value = encoded.next().ok_or(CORRUPTED)?;
                out.extend_from_slice(decode_integer_var(value).as_bytes());
            }
            placeholder::FLOAT => {
                let &value = encoded.next().ok_or(CORRUPTED)?;
                let text = decode_float_var(value).ok_or(CORRUPTED)?;
                out.extend_from_slice(text.as_bytes());
            }
            placeholder::DICTIONARY => {
                let value = dict.next().ok_or(CORRUPTED)?;
                out.extend_from_slice(value);
            }
            _ => out.push(byte),
        }
    }

    if encoded.next().is_some() || dict.next().is_some() {
        return Err(CORRUPTED);
    }

    String::from_utf8(out).map_err(|_| Stop::Fatal(IrErrorCode::DecodeError))
}

// ── Encoding ──────────────────────────────────────────────────────────────────

/// Whether `byte` separates tokens.
///
/// Token bytes are `+`, the run `-` `.` `/` `0`-`9`, ASCII letters, `\`, and
/// `_`. Everything else, including every non-ASCII byte, is a delimiter, so a
/// token boundary is always a UTF-8 character boundary.
fn is_delimiter(byte: u8) -> bool {
    !(byte == b'+'
        || (b'-'..=b'9').contains(&byte)
        || byte.is_ascii_alphabetic()
        || byte == b'\\'
        || byte == b'_')
}

/// A token is a variable if it contains a digit, or if it directly follows
/// `=` and contains a letter (`user=alice`).
fn is_variable(token: &str, follows_equals: bool) -> bool {
    token.bytes().any(|b| b.is_ascii_digit())
        || (follows_equals && token.bytes().any(|b| b.is_ascii_alphabetic()))
}

/// Write the message part of a record (variables, then logtype).
///
/// Call [`write_timestamp_delta`] right after to complete the record.
///
/// # Returns
///
/// Number of bytes written.
///
/// # Errors
///
/// - [`WireError::LengthOverflow`] if the logtype or a dictionary variable
///   is longer than `i32::MAX` bytes.
/// - [`WireError::Io`] if the writer fails.
pub fn write_message(w: &mut impl Write, message: &str) -> Result<usize, WireError> {
    let bytes = message.as_bytes();
    let mut logtype = Vec::with_capacity(bytes.len());
    let mut written = 0;
    let mut pos = 0;

    while pos < bytes.len() {
        if is_delimiter(bytes[pos]) {
            push_literal(&mut logtype, bytes[pos]);
            pos += 1;
            continue;
        }

        let start = pos;
        while pos < bytes.len() && !is_delimiter(bytes[pos]) {
            pos += 1;
        }
        let token = &message[start..pos];
        let follows_equals = start > 0 && bytes[start - 1] == b'=';

        if !is_variable(token, follows_equals) {
            for &b in token.as_bytes() {
                push_literal(&mut logtype, b);
            }
        } else if let Some(value) = encode_integer_var(token) {
            written += write_encoded_var(w, value)?;
            logtype.push(placeholder::INTEGER);
        } else if let Some(value) = encode_float_var(token) {
            written += write_encoded_var(w, value)?;
            logtype.push(placeholder::FLOAT);
        } else {
            written += write_length_prefixed(
                w,
                token.as_bytes(),
                "dictionary variable",
                [
                    payload::VAR_STR_LEN_UBYTE,
                    payload::VAR_STR_LEN_USHORT,
                    payload::VAR_STR_LEN_INT,
                ],
            )?;
            logtype.push(placeholder::DICTIONARY);
        }
    }

    written += write_length_prefixed(
        w,
        &logtype,
        "logtype",
        [
            payload::LOGTYPE_STR_LEN_UBYTE,
            payload::LOGTYPE_STR_LEN_USHORT,
            payload::LOGTYPE_STR_LEN_INT,
        ],
    )?;

    Ok(written)
}

fn push_literal(logtype: &mut Vec<u8>, byte: u8) {
    if placeholder::needs_escape(byte) {
        logtype.push(placeholder::ESCAPE);
    }
    logtype.push(byte);
}

fn write_encoded_var(w: &mut impl Write, value: i32) -> Result<usize, WireError> {
    w.write_all(&[payload::VAR_FOUR_BYTE_ENCODING])?;
    w.write_all(&value.to_be_bytes())?;
    Ok(5)
}

/// Write `data` behind the narrowest of the three length tags that fits.
fn write_length_prefixed(
    w: &mut impl Write,
    data: &[u8],
    what: &'static str,
    [ubyte, ushort, int]: [u8; 3],
) -> Result<usize, WireError> {
    let len = data.len();
    let header = if let Ok(n) = u8::try_from(len) {
        w.write_all(&[ubyte, n])?;
        2
    } else if let Ok(n) = u16::try_from(len) {
        w.write_all(&[ushort])?;
        w.write_all(&n.to_be_bytes())?;
        3
    } else if let Ok(n) = i32::try_from(len) {
        w.write_all(&[int])?;
        w.write_all(&n.to_be_bytes())?;
        5
    } else {
        return Err(WireError::LengthOverflow {
            what,
            len,
            limit: i32::MAX as usize,
        });
    };

    w.write_all(data)?;
    Ok(header + len)
}

/// Write a timestamp delta with the narrowest tag that holds it.
///
/// # Returns
///
/// Number of bytes written (2, 3, 5, or 9).
pub fn write_timestamp_delta(w: &mut impl Write, delta: i64) -> Result<usize, WireError> {
    if let Ok(d) = i8::try_from(delta) {
        w.write_all(&[payload::TIMESTAMP_DELTA_BYTE])?;
        w.write_all(&d.to_be_bytes())?;
        Ok(2)
    } else if let Ok(d) = i16::try_from(delta) {
        w.write_all(&[payload::TIMESTAMP_DELTA_SHORT])?;
        w.write_all(&d.to_be_bytes())?;
        Ok(3)
    } else if let Ok(d) = i32::try_from(delta) {
        w.write_all(&[payload::TIMESTAMP_DELTA_INT])?;
        w.write_all(&d.to_be_bytes())?;
        Ok(5)
    } else {
        w.write_all(&[payload::TIMESTAMP_DELTA_LONG])?;
        w.write_all(&delta.to_be_bytes())?;
        Ok(9)
    }
}

/// Write the end-of-stream marker.
pub fn write_end_of_stream(w: &mut impl Write) -> Result<usize, WireError> {
    w.write_all(&[payload::EOF])?;
    Ok(1)
}
