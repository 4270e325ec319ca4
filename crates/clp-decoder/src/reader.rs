use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use clp_types::{LogEvent, QueryFilter, StreamMetadata};
use tracing::debug;

use crate::config::{Compression, ReaderConfig};
use crate::engine::{DecodeSession, NextEvent};
use crate::error::DecodeError;
use crate::source::{ByteSource, ReaderSource};

/// First four bytes of every zstd frame.
pub const ZSTD_FRAME_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// Iterator over the events of one IR stream.
///
/// The preamble is decoded when the reader is built, so a stream with a
/// bad header fails up front instead of on the first `next()`. Iteration
/// ends at the end of the stream; an error is yielded once and then
/// iteration ends.
///
/// # Example
///
/// ```rust,no_run
/// use clp_decoder::{IrStreamReader, ReaderConfig};
/// use clp_types::QueryFilter;
///
/// let mut reader = IrStreamReader::open("app.clp.zst", &ReaderConfig::default())?;
/// let filter = QueryFilter::builder().add_pattern("*timeout*").build()?;
/// for event in reader.search(&filter) {
///     println!("{}", event?);
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct IrStreamReader<S> {
  session: DecodeSession<S>,
  metadata: Arc<StreamMetadata>,
  done: bool,
}

impl<S: ByteSource> IrStreamReader<S> {
  /// Build a reader over `source` and decode its preamble.
  ///
  /// # Errors
  ///
  /// Any error from [`DecodeSession::decode_preamble`].
  pub fn new(source: S) -> Result<Self, DecodeError> {
    Self::from_session(DecodeSession::new(source))
  }

  fn from_session(mut session: DecodeSession<S>) -> Result<Self, DecodeError> {
    let metadata = session.decode_preamble()?;
    Ok(Self {
      session,
      metadata,
      done: false,
    })
  }

  pub fn metadata(&self) -> &Arc<StreamMetadata> {
    &self.metadata
  }

  /// Records decoded so far, including those skipped by a search.
  pub fn decoded_count(&self) -> u64 {
    self.session.decoded_count()
  }

  /// Iterate over the events that match `filter`, stopping early once the
  /// filter's time range has been passed.
  pub fn search<'a>(&'a mut self, filter: &'a QueryFilter) -> Search<'a, S> {
    Search {
      reader: self,
      filter,
    }
  }

  pub fn into_session(self) -> DecodeSession<S> {
    self.session
  }

  fn next_matching(&mut self, filter: Option<&QueryFilter>) -> Option<Result<LogEvent, DecodeError>> {
    if self.done {
      return None;
    }
    match self.session.decode_next(filter) {
      Ok(NextEvent::Event(event)) => Some(Ok(event)),
      Ok(NextEvent::EndOfStream | NextEvent::NoMoreMatches) => {
        self.done = true;
        None
      }
      Err(e) => {
        self.done = true;
        Some(Err(e))
      }
    }
  }
}

impl<S: ByteSource> Iterator for IrStreamReader<S> {
  type Item = Result<LogEvent, DecodeError>;

  fn next(&mut self) -> Option<Self::Item> {
    self.next_matching(None)
  }
}

/// Filtered iterator returned by [`IrStreamReader::search`].
#[derive(Debug)]
pub struct Search<'a, S> {
  reader: &'a mut IrStreamReader<S>,
  filter: &'a QueryFilter,
}

impl<S: ByteSource> Iterator for Search<'_, S> {
  type Item = Result<LogEvent, DecodeError>;

  fn next(&mut self) -> Option<Self::Item> {
    self.reader.next_matching(Some(self.filter))
  }
}

/// Type-erased reader produced by [`IrStreamReader::open`] and
/// [`IrStreamReader::from_reader`].
pub type BoxedSource = ReaderSource<Box<dyn Read + Send>>;

impl IrStreamReader<BoxedSource> {
  /// Open an IR file, decompressing it first if `config` says so.
  ///
  /// # Errors
  ///
  /// [`DecodeError::Io`] if the file can't be opened or the zstd frame
  /// header is invalid, otherwise as [`new`](Self::new).
  pub fn open(path: impl AsRef<Path>, config: &ReaderConfig) -> Result<Self, DecodeError> {
    let path = path.as_ref();
    debug!(path = %path.display(), "opening IR file");
    let file = File::open(path)?;
    Self::from_reader(file, config)
  }

  /// Wrap any reader, applying `config`'s compression and buffer settings.
  ///
  /// # Errors
  ///
  /// As [`open`](Self::open).
  pub fn from_reader(reader: impl Read + Send + 'static, config: &ReaderConfig) -> Result<Self, DecodeError> {
    let mut buffered = BufReader::with_capacity(config.read_chunk_size.max(1), reader);
    let compressed = match config.compression {
      Compression::None => false,
      Compression::Zstd => true,
      Compression::Auto => starts_with_zstd_magic(&mut buffered)?,
    };
    debug!(compressed, "selected input decoding");

    let inner: Box<dyn Read + Send> = if compressed {
      Box::new(zstd::stream::read::Decoder::with_buffer(buffered)?)
    } else {
      Box::new(buffered)
    };
    let source = ReaderSource::with_chunk_size(inner, config.read_chunk_size);
    Self::from_session(DecodeSession::with_capacity(source, config.initial_capacity))
  }
}

/// Peek at the first bytes without consuming them.
fn starts_with_zstd_magic(reader: &mut impl BufRead) -> io::Result<bool> {
  let head = reader.fill_buf()?;
  Ok(head.starts_with(&ZSTD_FRAME_MAGIC))
}
