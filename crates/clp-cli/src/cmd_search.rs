/// Implementation of `clp-ir search`.
///
/// Builds a [`QueryFilter`] from the command-line flags and prints the
/// matching events. Decoding stops as soon as the stream has moved past the
/// end of the time range (plus `--margin`), or after `--limit` matches.
/// A summary line goes to stderr so stdout only carries events.
use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use clp_types::QueryFilter;

use crate::SearchArgs;
use crate::cmd_decode::{open, write_event};

/// Run the `clp-ir search` command.
///
/// # Errors
///
/// Returns an error for an invalid time range or margin, or for any
/// failure `decode` would report.
pub fn run(args: &SearchArgs) -> Result<()> {
    let filter = build_filter(args)?;
    let mut reader = open(&args.input)?;
    let mut out = BufWriter::new(io::stdout().lock());

    let limit = args.limit.unwrap_or(usize::MAX);
    let mut matches = 0usize;
    for event in reader.search(&filter).take(limit) {
        let event = event.with_context(|| format!("failed to decode {}", args.input.file.display()))?;
        write_event(&mut out, &event, args.format)?;
        matches += 1;
    }
    out.flush()?;

    eprintln!(
        "{matches} match{} in {} scanned event{}",
        if matches == 1 { "" } else { "es" },
        reader.decoded_count(),
        if reader.decoded_count() == 1 { "" } else { "s" },
    );
    Ok(())
}

/// Translate the search flags into a filter.
pub fn build_filter(args: &SearchArgs) -> Result<QueryFilter> {
    let filter = QueryFilter::builder()
        .time_range(args.begin, args.end)
        .termination_margin(args.margin)
        .case_sensitive(!args.ignore_case)
        .add_patterns(args.patterns.iter().cloned())
        .build()
        .context("invalid search parameters")?;
    Ok(filter)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;

    use super::*;
    use crate::{Cli, Commands};

    fn search_args(argv: &[&str]) -> SearchArgs {
        let mut full = vec!["clp-ir", "search", "app.clp"];
        full.extend_from_slice(argv);
        let cli = Cli::try_parse_from(full).unwrap();
        match cli.command {
            Commands::Search(args) => args,
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn flags_map_onto_the_filter() {
        let args = search_args(&[
            "--begin", "100", "--end", "200", "--margin", "5", "-p", "*error*", "--pattern", "*warn*",
        ]);
        assert_eq!(args.input.file, PathBuf::from("app.clp"));

        let filter = build_filter(&args).unwrap();
        assert_eq!(filter.begin(), Some(100));
        assert_eq!(filter.end(), Some(200));
        assert_eq!(filter.termination_margin(), 5);
        let patterns: Vec<&str> = filter.patterns().iter().map(|q| q.pattern()).collect();
        assert_eq!(patterns, ["*error*", "*warn*"]);
        assert!(filter.patterns().iter().all(|q| q.is_case_sensitive()));
    }

    #[test]
    fn ignore_case_applies_to_every_pattern() {
        let args = search_args(&["-i", "-p", "*ERROR*"]);
        let filter = build_filter(&args).unwrap();
        assert!(filter.matches_patterns("disk error"));
    }

    #[test]
    fn inverted_range_is_reported() {
        let args = search_args(&["--begin", "10", "--end", "5"]);
        let err = build_filter(&args).unwrap_err();
        insta::assert_snapshot!(format!("{err:#}"), @"invalid search parameters: time range is empty: begin 10 > end 5");
    }
}
