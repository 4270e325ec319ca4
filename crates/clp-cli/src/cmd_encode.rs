/// Implementation of `clp-ir encode`.
///
/// Reads JSON lines (`{"timestamp": <epoch ms>, "message": "<text>"}`) and
/// streams them through an [`IrWriter`] into the output file, optionally
/// through a zstd encoder. Input is processed line by line, so arbitrarily
/// large inputs are fine.
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clp_encoder::IrWriter;
use clp_encoder::encoder::DEFAULT_COMPRESSION_LEVEL;
use clp_types::StreamMetadata;
use serde::Deserialize;

use crate::EncodeArgs;

/// One input line.
#[derive(Debug, Deserialize, PartialEq)]
struct EventLine {
    timestamp: i64,
    message: String,
}

/// Run the `clp-ir encode` command.
///
/// # Errors
///
/// Returns an error if the input can't be read, a line isn't a valid event,
/// or the output can't be written.
pub fn run(args: &EncodeArgs) -> Result<()> {
    let input = open_input(&args.input)?;
    let mut events = parse_lines(input).peekable();

    let reference_timestamp = match (args.reference_timestamp, events.peek()) {
        (Some(ts), _) => ts,
        (None, Some(Ok(first))) => first.timestamp,
        (None, _) => 0,
    };
    let metadata = StreamMetadata::new(
        reference_timestamp,
        args.timestamp_format.as_str(),
        args.timezone.as_str(),
    );

    let file = File::create(&args.output)
        .with_context(|| format!("cannot create {}", args.output.display()))?;
    let out = BufWriter::new(file);

    let count = if args.compress {
        let zstd = zstd::stream::write::Encoder::new(out, DEFAULT_COMPRESSION_LEVEL)?;
        let (zstd, count) = write_stream(zstd, &metadata, events)?;
        zstd.finish()?.flush()?;
        count
    } else {
        let (mut out, count) = write_stream(out, &metadata, events)?;
        out.flush()?;
        count
    };

    eprintln!(
        "encoded {count} event{} into {}",
        if count == 1 { "" } else { "s" },
        args.output.display()
    );
    Ok(())
}

fn open_input(path: &Path) -> Result<Box<dyn BufRead>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file = File::open(path).with_context(|| format!("cannot read {}", path.display()))?;
    Ok(Box::new(BufReader::new(file)))
}

/// Parse non-blank lines, tagging errors with their 1-based line number.
fn parse_lines(input: impl BufRead) -> impl Iterator<Item = Result<EventLine>> {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| line.as_ref().map_or(true, |l| !l.trim().is_empty()))
        .map(|(i, line)| {
            let line = line.with_context(|| format!("cannot read line {}", i + 1))?;
            serde_json::from_str(&line).with_context(|| format!("line {}: invalid event", i + 1))
        })
}

fn write_stream<W: Write>(
    out: W,
    metadata: &StreamMetadata,
    events: impl Iterator<Item = Result<EventLine>>,
) -> Result<(W, u64)> {
    let mut writer = IrWriter::new(out);
    writer.write_preamble(metadata)?;
    for event in events {
        let event = event?;
        writer.write_event(event.timestamp, &event.message)?;
    }
    let count = writer.events_written();
    Ok((writer.finish()?, count))
}
