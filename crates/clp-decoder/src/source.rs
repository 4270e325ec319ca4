use std::io::{self, Read};

/// Supplier of raw stream bytes.
///
/// `read_more` appends whatever is available to the end of `buf` and
/// returns how many bytes it added. It may block. Returning `Ok(0)` means
/// the source is exhausted and will never produce more.
pub trait ByteSource {
  fn read_more(&mut self, buf: &mut Vec<u8>) -> io::Result<usize>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
  fn read_more(&mut self, buf: &mut Vec<u8>) -> io::Result<usize> {
    (**self).read_more(buf)
  }
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
  fn read_more(&mut self, buf: &mut Vec<u8>) -> io::Result<usize> {
    (**self).read_more(buf)
  }
}

/// An in-memory stream handed over in one piece.
impl ByteSource for &[u8] {
  fn read_more(&mut self, buf: &mut Vec<u8>) -> io::Result<usize> {
    let n = self.len();
    buf.extend_from_slice(self);
    *self = &[];
    Ok(n)
  }
}

/// Adapts any [`Read`] into a [`ByteSource`], reading at most `chunk_size`
/// bytes per call.
#[derive(Debug)]
pub struct ReaderSource<R> {
  reader: R,
  chunk_size: usize,
}

impl<R: Read> ReaderSource<R> {
  /// Default read size.
  pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

  pub fn new(reader: R) -> Self {
    Self::with_chunk_size(reader, Self::DEFAULT_CHUNK_SIZE)
  }

  /// A `chunk_size` of zero is bumped to one so the source can make progress.
  pub fn with_chunk_size(reader: R, chunk_size: usize) -> Self {
    Self {
      reader,
      chunk_size: chunk_size.max(1),
    }
  }

  pub fn chunk_size(&self) -> usize {
    self.chunk_size
  }

  pub fn into_inner(self) -> R {
    self.reader
  }
}

impl<R: Read> ByteSource for ReaderSource<R> {
  fn read_more(&mut self, buf: &mut Vec<u8>) -> io::Result<usize> {
    let start = buf.len();
    buf.resize(start + self.chunk_size, 0);
    loop {
      match self.reader.read(&mut buf[start..]) {
        Ok(n) => {
          buf.truncate(start + n);
          return Ok(n);
        }
        Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
        Err(e) => {
          buf.truncate(start);
          return Err(e);
        }
      }
    }
  }
}
