/// Implementation of `clp-ir inspect`.
///
/// Decodes the preamble and then every record, and prints a summary of the
/// stream.
///
/// # Output format
///
/// ```text
/// Encoding:          four-byte
/// Version:           v0.0.0
/// Reference time:    1700000000000 (2023-11-14 22:13:20.000+00:00)
/// Timestamp pattern: %Y-%m-%d %H:%M:%S,%3
/// Timezone:          America/Toronto
/// Events:            3
/// First event:       2023-11-14 22:13:20.000+00:00
/// Last event:        2023-11-14 22:13:21.250+00:00
/// ```
use std::fmt::Write as _;

use anyhow::{Context, Result};
use clp_types::{StreamMetadata, format_timestamp};

use crate::InspectArgs;
use crate::cmd_decode::open;

/// Event statistics gathered while scanning.
#[derive(Default)]
struct Stats {
    events: u64,
    first: Option<i64>,
    last: Option<i64>,
}

/// Run the `clp-ir inspect` command.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or any record fails to
/// decode.
pub fn run(args: &InspectArgs) -> Result<()> {
    let mut reader = open(&args.input)?;
    let metadata = reader.metadata().clone();

    let mut stats = Stats::default();
    for event in &mut reader {
        let event = event.with_context(|| format!("failed to decode {}", args.input.file.display()))?;
        stats.events += 1;
        stats.first.get_or_insert(event.timestamp());
        stats.last = Some(event.timestamp());
    }

    print!("{}", render(&metadata, &stats));
    Ok(())
}

fn render(metadata: &StreamMetadata, stats: &Stats) -> String {
    let mut out = String::new();
    let encoding = if metadata.uses_narrow_encoding() {
        "four-byte"
    } else {
        "eight-byte"
    };
    let _ = writeln!(out, "Encoding:          {encoding}");
    let _ = writeln!(out, "Version:           {}", metadata.version().unwrap_or("(none)"));
    let _ = writeln!(
        out,
        "Reference time:    {} ({})",
        metadata.reference_timestamp(),
        format_timestamp(metadata.reference_timestamp())
    );
    let _ = writeln!(out, "Timestamp pattern: {}", metadata.timestamp_format());
    let _ = writeln!(out, "Timezone:          {}", metadata.timezone_id());
    let _ = writeln!(out, "Events:            {}", stats.events);
    if let (Some(first), Some(last)) = (stats.first, stats.last) {
        let _ = writeln!(out, "First event:       {}", format_timestamp(first));
        let _ = writeln!(out, "Last event:        {}", format_timestamp(last));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_with_events() {
        let meta = StreamMetadata::new(1_700_000_000_000, "%Y-%m-%d %H:%M:%S,%3", "America/Toronto");
        let stats = Stats {
            events: 3,
            first: Some(1_700_000_000_000),
            last: Some(1_700_000_001_250),
        };
        insta::assert_snapshot!(render(&meta, &stats), @r"
        Encoding:          four-byte
        Version:           (none)
        Reference time:    1700000000000 (2023-11-14 22:13:20.000+00:00)
        Timestamp pattern: %Y-%m-%d %H:%M:%S,%3
        Timezone:          America/Toronto
        Events:            3
        First event:       2023-11-14 22:13:20.000+00:00
        Last event:        2023-11-14 22:13:21.250+00:00
        ");
    }

    #[test]
    fn summary_of_empty_stream_omits_span() {
        let meta = StreamMetadata::new(0, "", "UTC");
        let out = render(&meta, &Stats::default());
        assert!(out.contains("Events:            0\n"));
        assert!(!out.contains("First event"));
    }
}
