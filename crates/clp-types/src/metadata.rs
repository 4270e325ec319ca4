use clp_wire::EncodingWidth;
use clp_wire::protocol::metadata::{
  REFERENCE_TIMESTAMP_KEY, TIMESTAMP_PATTERN_KEY, TIMEZONE_ID_KEY, VERSION_KEY,
};
use serde_json::Value;

use crate::error::MetadataError;

/// Stream-level metadata carried by the IR preamble.
///
/// Built once per stream and then shared, read-only, with every
/// [`LogEvent`](crate::LogEvent) decoded from that stream.
///
/// ```text
/// ┌──────────────────────┬───────────────────────────────────────────────┐
/// │ Field                │ Source key / meaning                          │
/// ├──────────────────────┼───────────────────────────────────────────────┤
/// │ reference_timestamp  │ REFERENCE_TIMESTAMP: epoch ms baseline        │
/// │ timestamp_format     │ TIMESTAMP_PATTERN: display pattern            │
/// │ timezone_id          │ TZ_ID: timezone the stream was written in     │
/// │ uses_narrow_encoding │ magic number: always true once constructed    │
/// │ version              │ VERSION: protocol version string, if present  │
/// └──────────────────────┴───────────────────────────────────────────────┘
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamMetadata {
  reference_timestamp: i64,
  timestamp_format: String,
  timezone_id: String,
  uses_narrow_encoding: bool,
  version: Option<String>,
}

impl StreamMetadata {
  /// Metadata for a four-byte encoded stream.
  pub fn new(
    reference_timestamp: i64,
    timestamp_format: impl Into<String>,
    timezone_id: impl Into<String>,
  ) -> Self {
    Self {
      reference_timestamp,
      timestamp_format: timestamp_format.into(),
      timezone_id: timezone_id.into(),
      uses_narrow_encoding: true,
      version: None,
    }
  }

  /// Validate the preamble's metadata document and extract its fields.
  ///
  /// # Errors
  ///
  /// - [`MetadataError::UnsupportedEncoding`] if `width` is the eight-byte
  ///   variant, or if the reference timestamp is not an integer (the parse
  ///   error text is kept).
  /// - [`MetadataError::MetadataCorrupted`] if the reference timestamp,
  ///   timestamp pattern, or timezone id is missing or not a string.
  pub fn from_json(doc: &Value, width: EncodingWidth) -> Result<Self, MetadataError> {
    if !width.is_narrow() {
      return Err(MetadataError::UnsupportedEncoding(
        "eight-byte encoded streams are not supported".to_string(),
      ));
    }

    let reference_timestamp = required_str(doc, REFERENCE_TIMESTAMP_KEY)?
      .parse::<i64>()
      .map_err(|e| {
        MetadataError::UnsupportedEncoding(format!("{REFERENCE_TIMESTAMP_KEY}: {e}"))
      })?;
    let timestamp_format = required_str(doc, TIMESTAMP_PATTERN_KEY)?.to_string();
    let timezone_id = required_str(doc, TIMEZONE_ID_KEY)?.to_string();
    let version = doc.get(VERSION_KEY).and_then(Value::as_str).map(str::to_string);

    Ok(Self {
      reference_timestamp,
      timestamp_format,
      timezone_id,
      uses_narrow_encoding: true,
      version,
    })
  }

  /// Reference epoch timestamp in milliseconds; the first event's timestamp
  /// is this plus its delta.
  pub fn reference_timestamp(&self) -> i64 {
    self.reference_timestamp
  }

  pub fn timestamp_format(&self) -> &str {
    &self.timestamp_format
  }

  pub fn timezone_id(&self) -> &str {
    &self.timezone_id
  }

  pub fn uses_narrow_encoding(&self) -> bool {
    self.uses_narrow_encoding
  }

  pub fn version(&self) -> Option<&str> {
    self.version.as_deref()
  }
}

fn required_str<'a>(doc: &'a Value, key: &str) -> Result<&'a str, MetadataError> {
  match doc.get(key) {
    Some(Value::String(s)) => Ok(s),
    Some(other) => Err(MetadataError::MetadataCorrupted(format!(
      "{key} must be a string, found {}",
      json_kind(other)
    ))),
    None => Err(MetadataError::MetadataCorrupted(format!(
      "{key} cannot be found in the metadata"
    ))),
  }
}

fn json_kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn valid() -> Value {
    json!({
      "VERSION": "v0.0.0",
      "REFERENCE_TIMESTAMP": "1700000000000",
      "TIMESTAMP_PATTERN": "%Y-%m-%d %H:%M:%S,%3",
      "TIMESTAMP_PATTERN_SYNTAX": "",
      "TZ_ID": "America/Toronto",
    })
  }

  #[test]
  fn parses_all_fields() {
    let meta = StreamMetadata::from_json(&valid(), EncodingWidth::FourByte).unwrap();
    assert_eq!(meta.reference_timestamp(), 1_700_000_000_000);
    assert_eq!(meta.timestamp_format(), "%Y-%m-%d %H:%M:%S,%3");
    assert_eq!(meta.timezone_id(), "America/Toronto");
    assert!(meta.uses_narrow_encoding());
    assert_eq!(meta.version(), Some("v0.0.0"));
  }

  #[test]
  fn version_is_optional() {
    let mut doc = valid();
    doc.as_object_mut().unwrap().remove("VERSION");
    let meta = StreamMetadata::from_json(&doc, EncodingWidth::FourByte).unwrap();
    assert_eq!(meta.version(), None);
  }

  #[test]
  fn eight_byte_width_is_unsupported() {
    let result = StreamMetadata::from_json(&valid(), EncodingWidth::EightByte);
    assert!(matches!(result, Err(MetadataError::UnsupportedEncoding(_))));
  }

  #[test]
  fn non_numeric_reference_timestamp_is_unsupported() {
    let mut doc = valid();
    doc["REFERENCE_TIMESTAMP"] = json!("not_a_number");
    let err = StreamMetadata::from_json(&doc, EncodingWidth::FourByte).unwrap_err();
    let MetadataError::UnsupportedEncoding(text) = err else {
      panic!("expected UnsupportedEncoding, got {err:?}");
    };
    assert!(text.contains("invalid digit"), "{text}");
  }

  #[test]
  fn numeric_reference_timestamp_is_corrupted() {
    let mut doc = valid();
    doc["REFERENCE_TIMESTAMP"] = json!(1_700_000_000_000_i64);
    let result = StreamMetadata::from_json(&doc, EncodingWidth::FourByte);
    assert!(matches!(result, Err(MetadataError::MetadataCorrupted(_))));
  }

  #[test]
  fn wrong_type_timestamp_format_is_corrupted() {
    let mut doc = valid();
    doc["TIMESTAMP_PATTERN"] = json!(5);
    let err = StreamMetadata::from_json(&doc, EncodingWidth::FourByte).unwrap_err();
    assert_eq!(
      err,
      MetadataError::MetadataCorrupted("TIMESTAMP_PATTERN must be a string, found a number".into())
    );
  }

  #[test]
  fn missing_timezone_is_corrupted() {
    let mut doc = valid();
    doc.as_object_mut().unwrap().remove("TZ_ID");
    let err = StreamMetadata::from_json(&doc, EncodingWidth::FourByte).unwrap_err();
    assert_eq!(
      err,
      MetadataError::MetadataCorrupted("TZ_ID cannot be found in the metadata".into())
    );
  }

  #[test]
  fn non_object_document_is_corrupted() {
    let result = StreamMetadata::from_json(&json!([1, 2, 3]), EncodingWidth::FourByte);
    assert!(matches!(result, Err(MetadataError::MetadataCorrupted(_))));
  }
}
