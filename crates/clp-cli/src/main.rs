/// CLP IR command-line tool: inspect, validate, decode, search, and encode
/// four-byte CLP IR log streams.
///
/// # Command overview
///
/// ```text
/// clp-ir <COMMAND> [OPTIONS]
///
/// Commands:
///   inspect    Print the preamble metadata and record statistics
///   validate   Check a stream for structural correctness
///   decode     Print every log event
///   search     Print events matching a time range and wildcard patterns
///   encode     Create an IR stream from JSON lines
///   help       Print help information
///
/// Global options:
///   -v, --verbose    Log decoder internals to stderr
///   -h, --help       Print help
///   -V, --version    Print version
/// ```
///
/// # Exit codes
///
/// | Code | Meaning                                   |
/// |------|-------------------------------------------|
/// | 0    | Success                                   |
/// | 1    | Error (I/O failure, invalid stream, etc.) |
///
/// Errors and logs go to stderr so stdout can be piped cleanly.
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use clp_decoder::{Compression, ReaderConfig};
use tracing::Level;
use tracing_subscriber::EnvFilter;

mod cmd_decode;
mod cmd_encode;
mod cmd_inspect;
mod cmd_search;
mod cmd_validate;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// The CLP IR command-line tool.
#[derive(Parser)]
#[command(name = "clp-ir", version, about = "CLP IR log stream tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log decoder internals (preamble stages, refills) to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Print the preamble metadata and record statistics of a stream.
    Inspect(InspectArgs),
    /// Check a stream for structural correctness.
    Validate(ValidateArgs),
    /// Print every log event in a stream.
    Decode(DecodeArgs),
    /// Print the events that match a time range and wildcard patterns.
    Search(SearchArgs),
    /// Create an IR stream from JSON lines.
    Encode(EncodeArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Input options shared by every command that reads a stream.
///
/// ```text
/// ┌───────────────┬──────────────────────────────────────────────────────┐
/// │ Flag          │ Values / default                                     │
/// ├───────────────┼──────────────────────────────────────────────────────┤
/// │ --compression │ auto (default) | none | zstd                         │
/// │ --chunk-size  │ bytes per read, default 65536                        │
/// └───────────────┴──────────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct InputArgs {
    /// Path to the IR stream (`.clp` or zstd-compressed `.clp.zst`).
    pub file: PathBuf,

    /// How to treat a zstd frame around the stream.
    #[arg(long, value_enum, default_value_t = CompressionArg::Auto)]
    pub compression: CompressionArg,

    /// Bytes requested from the file per read.
    #[arg(long, default_value_t = 64 * 1024)]
    pub chunk_size: usize,
}

impl InputArgs {
    pub fn reader_config(&self) -> ReaderConfig {
        ReaderConfig {
            read_chunk_size: self.chunk_size,
            compression: self.compression.into(),
            ..ReaderConfig::default()
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum CompressionArg {
    Auto,
    None,
    Zstd,
}

impl From<CompressionArg> for Compression {
    fn from(arg: CompressionArg) -> Self {
        match arg {
            CompressionArg::Auto => Self::Auto,
            CompressionArg::None => Self::None,
            CompressionArg::Zstd => Self::Zstd,
        }
    }
}

/// Arguments for `clp-ir inspect`.
#[derive(clap::Args)]
pub struct InspectArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

/// Arguments for `clp-ir validate`.
///
/// Decodes the whole stream and reports either a set of success checkmarks
/// or the first error. Exits with code 1 on any structural problem.
#[derive(clap::Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

/// Arguments for `clp-ir decode`.
///
/// ```text
/// ┌───────────────┬──────────────────────────────────────────────────────┐
/// │ Flag          │ Effect                                               │
/// ├───────────────┼──────────────────────────────────────────────────────┤
/// │ --format      │ text (default): "<timestamp> <message>" per line     │
/// │               │ raw: message only                                    │
/// │               │ json: one JSON object per event                      │
/// │ -o / --output │ write to file instead of stdout                      │
/// └───────────────┴──────────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct DecodeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Write events to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Text,
    Raw,
    Json,
}

/// Arguments for `clp-ir search`.
///
/// Patterns use `*` (any run) and `?` (one character) and must match the
/// whole message. An event matches if it is inside the time range and
/// matches at least one pattern. Scanning stops at the first event past
/// `--end` plus `--margin`.
///
/// ```text
/// ┌───────────────┬──────────────────────────────────────────────────────┐
/// │ Flag          │ Effect                                               │
/// ├───────────────┼──────────────────────────────────────────────────────┤
/// │ --begin MS    │ inclusive lower bound, epoch milliseconds            │
/// │ --end MS      │ inclusive upper bound, epoch milliseconds            │
/// │ --margin MS   │ keep scanning this far past --end (default 0)        │
/// │ --pattern P   │ wildcard pattern, repeatable                         │
/// │ --ignore-case │ match patterns case-insensitively                    │
/// │ --limit N     │ stop after N matches                                 │
/// └───────────────┴──────────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct SearchArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Inclusive lower time bound (epoch ms).
    #[arg(long)]
    pub begin: Option<i64>,

    /// Inclusive upper time bound (epoch ms).
    #[arg(long)]
    pub end: Option<i64>,

    /// Extra milliseconds past `--end` to scan before giving up.
    #[arg(long, default_value_t = 0)]
    pub margin: i64,

    /// Wildcard pattern; may be given several times.
    #[arg(short, long = "pattern")]
    pub patterns: Vec<String>,

    /// Match patterns case-insensitively.
    #[arg(short = 'i', long)]
    pub ignore_case: bool,

    /// Stop after this many matches.
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Arguments for `clp-ir encode`.
///
/// Reads one JSON object per line:
///
/// ```json
/// {"timestamp": 1700000000000, "message": "Starting server on port 8080"}
/// ```
///
/// Blank lines are skipped. The reference timestamp defaults to the first
/// event's timestamp.
#[derive(clap::Args)]
pub struct EncodeArgs {
    /// JSON-lines input file, or `-` for stdin.
    pub input: PathBuf,

    /// Output IR file path.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Reference timestamp recorded in the preamble (epoch ms).
    #[arg(long)]
    pub reference_timestamp: Option<i64>,

    /// Timestamp pattern recorded in the preamble.
    #[arg(long, default_value = clp_encoder::encoder::DEFAULT_TIMESTAMP_FORMAT)]
    pub timestamp_format: String,

    /// Timezone id recorded in the preamble.
    #[arg(long, default_value = clp_encoder::encoder::DEFAULT_TIMEZONE_ID)]
    pub timezone: String,

    /// Wrap the stream in a zstd frame.
    #[arg(long)]
    pub compress: bool,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Inspect(args) => cmd_inspect::run(&args),
        Commands::Validate(args) => cmd_validate::run(&args),
        Commands::Decode(args) => cmd_decode::run(&args),
        Commands::Search(args) => cmd_search::run(&args),
        Commands::Encode(args) => cmd_encode::run(&args),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}
