#![warn(clippy::pedantic)]

pub mod error;
pub mod event;
pub mod filter;
pub mod metadata;
pub mod wildcard;

pub use error::{FilterError, MetadataError};
pub use event::{LogEvent, format_timestamp};
pub use filter::{FilterVerdict, PatternMatch, QueryFilter, QueryFilterBuilder};
pub use metadata::StreamMetadata;
pub use wildcard::{WildcardQuery, wildcard_match};
