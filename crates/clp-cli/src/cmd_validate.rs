/// Implementation of `clp-ir validate`.
///
/// Decodes the entire stream and reports either a series of success
/// checkmarks (`✓`) or a diagnostic failure line (`✗`). Out-of-order
/// timestamps are reported with a warning (`!`) but don't fail validation;
/// they only matter to searches that rely on early termination.
///
/// # Success output
///
/// ```text
/// ✓ Preamble: valid (four-byte encoding, v0.0.0)
/// ✓ Events: 1204 events decoded successfully
/// ✓ Timestamps: non-decreasing
/// ```
///
/// # Failure output
///
/// ```text
/// ✗ Error: incomplete IR stream: source exhausted with 17 unconsumed bytes
/// ```
use anyhow::{Result, anyhow};
use clp_decoder::{DecodeError, IrStreamReader};

use crate::ValidateArgs;

/// Run the `clp-ir validate` command.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or the stream fails any
/// structural check.
pub fn run(args: &ValidateArgs) -> Result<()> {
    let mut reader = match IrStreamReader::open(&args.input.file, &args.input.reader_config()) {
        Ok(reader) => reader,
        Err(e) => return fail(&e),
    };
    println!(
        "✓ Preamble: valid (four-byte encoding, {})",
        reader.metadata().version().unwrap_or("no version")
    );

    let mut events = 0u64;
    let mut out_of_order = 0u64;
    let mut previous = i64::MIN;
    for event in &mut reader {
        let event = match event {
            Ok(event) => event,
            Err(e) => return fail(&e),
        };
        if event.timestamp() < previous {
            out_of_order += 1;
        }
        previous = event.timestamp();
        events += 1;
    }

    println!(
        "✓ Events: {events} event{} decoded successfully",
        if events == 1 { "" } else { "s" }
    );
    if out_of_order == 0 {
        println!("✓ Timestamps: non-decreasing");
    } else {
        println!("! Timestamps: {out_of_order} event(s) earlier than their predecessor");
    }
    Ok(())
}

fn fail(e: &DecodeError) -> Result<()> {
    println!("✗ Error: {}", diagnostic(e));
    Err(anyhow!("validation failed"))
}

/// Human-readable description of a decode failure.
///
/// ```text
/// ┌──────────────────────┬──────────────────────────────────────────────┐
/// │ DecodeError variant  │ Diagnostic                                   │
/// ├──────────────────────┼──────────────────────────────────────────────┤
/// │ Codec(CorruptedIR)   │ "not a CLP IR stream or corrupted record …"  │
/// │ UnsupportedEncoding  │ "unsupported encoding: …"                    │
/// │ Io                   │ "I/O error: …"                               │
/// │ anything else        │ "<error Display>"                            │
/// └──────────────────────┴──────────────────────────────────────────────┘
/// ```
fn diagnostic(e: &DecodeError) -> String {
    match e {
        DecodeError::Codec { code } => {
            format!("not a CLP IR stream or corrupted record ({code})")
        }
        DecodeError::UnsupportedEncoding(reason) => format!("unsupported encoding: {reason}"),
        DecodeError::Io(inner) => format!("I/O error: {inner}"),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use clp_decoder::IrErrorCode;

    use super::*;

    #[test]
    fn codec_diagnostic_names_the_code() {
        let e = DecodeError::Codec {
            code: IrErrorCode::CorruptedIr,
        };
        insta::assert_snapshot!(diagnostic(&e), @"not a CLP IR stream or corrupted record (CorruptedIR (3))");
    }

    #[test]
    fn incomplete_diagnostic_uses_display() {
        let e = DecodeError::IncompleteStream { buffered: 17 };
        insta::assert_snapshot!(diagnostic(&e), @"incomplete IR stream: source exhausted with 17 unconsumed bytes");
    }
}
