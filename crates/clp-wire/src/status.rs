use crate::protocol::IrErrorCode;

/// Outcome of a single codec call on a byte view.
///
/// Every decode primitive in this crate is a pure function over a borrowed
/// slice. Whether the slice held enough bytes is part of the result, not an
/// error, because a streaming caller is expected to refill and retry:
///
/// ```text
///   ┌──────────────┐  Success { consumed, value }  → commit `consumed` bytes
///   │ decode(view) │─ NeedMoreInput                → refill, retry same view
///   └──────────────┘  EndOfStream                  → stop, nothing consumed
///                     Fatal(code)                  → abort the stream
/// ```
///
/// `consumed` counts bytes from the start of the view; nothing is consumed
/// for any of the other variants.
#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use]
pub enum DecodeStatus<T> {
    Success { consumed: usize, value: T },
    NeedMoreInput,
    EndOfStream,
    Fatal(IrErrorCode),
}

impl<T> DecodeStatus<T> {
    /// Transform the decoded value, keeping every other outcome as-is.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> DecodeStatus<U> {
        match self {
            Self::Success { consumed, value } => DecodeStatus::Success {
                consumed,
                value: f(value),
            },
            Self::NeedMoreInput => DecodeStatus::NeedMoreInput,
            Self::EndOfStream => DecodeStatus::EndOfStream,
            Self::Fatal(code) => DecodeStatus::Fatal(code),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Internal short-circuit type used while walking a view.
///
/// Parsers inside this crate return `Result<T, Stop>` so they can use `?`,
/// then convert to [`DecodeStatus`] at the public boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Stop {
    NeedMoreInput,
    Fatal(IrErrorCode),
}

impl<T> From<Stop> for DecodeStatus<T> {
    fn from(stop: Stop) -> Self {
        match stop {
            Stop::NeedMoreInput => Self::NeedMoreInput,
            Stop::Fatal(code) => Self::Fatal(code),
        }
    }
}

/// Bounds-checked forward reader over a byte view.
///
/// Running off the end of the view is reported as [`Stop::NeedMoreInput`]:
/// in a stream, a short view only means the rest hasn't arrived yet.
pub(crate) struct ViewReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ViewReader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    pub(crate) fn peek_u8(&self) -> Result<u8, Stop> {
        self.buf.get(self.pos).copied().ok_or(Stop::NeedMoreInput)
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8, Stop> {
        let byte = self.peek_u8()?;
        self.pos += 1;
        Ok(byte)
    }

    pub(crate) fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], Stop> {
        let end = self.pos.checked_add(len).ok_or(Stop::Fatal(IrErrorCode::CorruptedIr))?;
        let bytes = self.buf.get(self.pos..end).ok_or(Stop::NeedMoreInput)?;
        self.pos = end;
        Ok(bytes)
    }

    pub(crate) fn read_array<const N: usize>(&mut self) -> Result<[u8; N], Stop> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub(crate) fn read_i8(&mut self) -> Result<i8, Stop> {
        Ok(i8::from_be_bytes(self.read_array()?))
    }

    pub(crate) fn read_u16(&mut self) -> Result<u16, Stop> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    pub(crate) fn read_i16(&mut self) -> Result<i16, Stop> {
        Ok(i16::from_be_bytes(self.read_array()?))
    }

    pub(crate) fn read_i32(&mut self) -> Result<i32, Stop> {
        Ok(i32::from_be_bytes(self.read_array()?))
    }

    pub(crate) fn read_i64(&mut self) -> Result<i64, Stop> {
        Ok(i64::from_be_bytes(self.read_array()?))
    }
}
