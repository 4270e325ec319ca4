/// Implementation of `clp-ir decode`.
///
/// Streams every event of an IR file to stdout (or `--output`), one per
/// line. Records are printed as soon as they are decoded, so the command
/// runs in constant memory regardless of stream size.
///
/// # Output formats
///
/// ```text
/// text  2023-11-14 22:13:20.000+00:00 Starting server on port 8080
/// raw   Starting server on port 8080
/// json  {"index":0,"message":"Starting server on port 8080","timestamp":1700000000000}
/// ```
use std::fs::File;
use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use clp_decoder::{BoxedSource, IrStreamReader};
use clp_types::LogEvent;
use serde_json::json;

use crate::{DecodeArgs, InputArgs, OutputFormat};

/// Run the `clp-ir decode` command.
///
/// # Errors
///
/// Returns an error if the file cannot be opened, the stream is invalid,
/// or the output cannot be written.
pub fn run(args: &DecodeArgs) -> Result<()> {
    let reader = open(&args.input)?;

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("cannot create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    for event in reader {
        let event = event.with_context(|| format!("failed to decode {}", args.input.file.display()))?;
        write_event(&mut out, &event, args.format)?;
    }
    out.flush()?;
    Ok(())
}

/// Open the stream and decode its preamble.
pub fn open(input: &InputArgs) -> Result<IrStreamReader<BoxedSource>> {
    IrStreamReader::open(&input.file, &input.reader_config())
        .with_context(|| format!("failed to open {}", input.file.display()))
}

/// Write one event as a single line.
pub fn write_event(w: &mut impl Write, event: &LogEvent, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Text => writeln!(w, "{event}"),
        OutputFormat::Raw => writeln!(w, "{}", event.message()),
        OutputFormat::Json => {
            let line = json!({
                "index": event.index(),
                "timestamp": event.timestamp(),
                "message": event.message(),
            });
            writeln!(w, "{line}")
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use clp_types::StreamMetadata;

    use super::*;

    fn render(format: OutputFormat) -> String {
        let meta = Arc::new(StreamMetadata::new(0, "", "UTC"));
        let event = LogEvent::new("user=alice \"quoted\"".into(), 1_700_000_000_000, 4, meta);
        let mut out = Vec::new();
        write_event(&mut out, &event, format).unwrap();
        String::from_utf8(out).unwrap().trim_end().to_string()
    }

    #[test]
    fn text_format() {
        insta::assert_snapshot!(render(OutputFormat::Text), @r#"2023-11-14 22:13:20.000+00:00 user=alice "quoted""#);
    }

    #[test]
    fn raw_format() {
        insta::assert_snapshot!(render(OutputFormat::Raw), @r#"user=alice "quoted""#);
    }

    #[test]
    fn json_format() {
        insta::assert_snapshot!(render(OutputFormat::Json), @r#"{"index":4,"message":"user=alice \"quoted\"","timestamp":1700000000000}"#);
    }
}
