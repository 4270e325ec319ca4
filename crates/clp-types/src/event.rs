use std::fmt;
use std::sync::Arc;

use chrono::DateTime;

use crate::metadata::StreamMetadata;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f%:z";

/// Render epoch milliseconds as `YYYY-MM-DD HH:MM:SS.mmm+00:00` in UTC, or
/// as the raw number if `chrono` can't represent it.
pub fn format_timestamp(ms: i64) -> String {
  DateTime::from_timestamp_millis(ms).map_or_else(
    || ms.to_string(),
    |dt| dt.format(TIMESTAMP_FORMAT).to_string(),
  )
}

/// One decoded log record.
///
/// `index` counts every record decoded from the stream, including those a
/// filter rejected, so gaps between returned indices show how many records
/// were skipped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEvent {
  message: String,
  timestamp: i64,
  index: u64,
  metadata: Arc<StreamMetadata>,
}

impl LogEvent {
  pub fn new(message: String, timestamp: i64, index: u64, metadata: Arc<StreamMetadata>) -> Self {
    Self {
      message,
      timestamp,
      index,
      metadata,
    }
  }

  pub fn message(&self) -> &str {
    &self.message
  }

  /// Absolute timestamp, epoch milliseconds.
  pub fn timestamp(&self) -> i64 {
    self.timestamp
  }

  /// Zero-based position among all decoded records.
  pub fn index(&self) -> u64 {
    self.index
  }

  pub fn metadata(&self) -> &Arc<StreamMetadata> {
    &self.metadata
  }

  pub fn into_message(self) -> String {
    self.message
  }

  /// The timestamp as rendered by [`format_timestamp`].
  pub fn formatted_timestamp(&self) -> String {
    format_timestamp(self.timestamp)
  }

  /// `<formatted timestamp> <message>`, as printed by the CLI.
  pub fn formatted_message(&self) -> String {
    self.to_string()
  }
}

impl fmt::Display for LogEvent {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {}", self.formatted_timestamp(), self.message)
  }
}
