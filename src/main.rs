use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::Parser;
use tgrep::{Error, FormatError, LogSearcher, SearchConfig, TimePattern};
use tracing::{debug, error};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG: &str = "/logs/haproxy.log";

const EXAMPLES: &str = "\
Examples:
  tgrep 8:42:04 log.dat       lines stamped exactly 08:42:04
  tgrep 10:01 log.dat         lines between 10:01:00 and 10:01:59
  tgrep 23:59-0:03 log.dat    lines between 23:59:00 and 00:03:59";

#[derive(Parser)]
#[command(name = "tgrep")]
#[command(about = "Print the log lines written at a time of day or within a time range")]
#[command(after_help = EXAMPLES)]
struct Cli {
    /// Time pattern (H:MM, H:MM:SS or a dash-joined range) and log file, in
    /// either order. The file defaults to /logs/haproxy.log
    #[arg(value_name = "PATTERN|FILE", num_args = 1..=2, required = true)]
    args: Vec<String>,

    /// Date treated as today (YYYY-MM-DD); defaults to the local date
    #[arg(long)]
    date: Option<NaiveDate>,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        // Downstream pager or `head` went away.
        Err(Error::Io(err)) if err.kind() == io::ErrorKind::BrokenPipe => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("tgrep: {err}");
            exit_code(&err)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), Error> {
    let (pattern, path) = resolve_args(&cli.args)?;
    let mut config = SearchConfig::default();
    if let Some(date) = cli.date {
        config = config.with_today(date);
    }

    let mut searcher = match LogSearcher::open(&path, config) {
        Ok(searcher) => searcher,
        Err(err) => {
            error!(path = %path.display(), "unable to open log file");
            return Err(err);
        }
    };
    let result = searcher.search(&pattern)?;
    debug!(%pattern, ranges = result.ranges().len(), bytes = result.byte_len(), "search complete");

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for line in searcher.lines(&result) {
        out.write_all(line?.raw())?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

/// Picks out the pattern and the file. Whichever argument parses as a
/// pattern is the pattern.
fn resolve_args(args: &[String]) -> Result<(TimePattern, PathBuf), FormatError> {
    match args {
        [pattern] => Ok((TimePattern::parse(pattern)?, PathBuf::from(DEFAULT_LOG))),
        [first, second] => match TimePattern::parse(first) {
            Ok(pattern) => Ok((pattern, PathBuf::from(second))),
            Err(err) => match TimePattern::parse(second) {
                Ok(pattern) => Ok((pattern, PathBuf::from(first))),
                Err(_) => Err(err),
            },
        },
        _ => Err(FormatError::InvalidPattern(args.join(" "))),
    }
}

fn exit_code(err: &Error) -> ExitCode {
    match err {
        Error::Io(_) => ExitCode::from(1),
        Error::Format(_) => ExitCode::from(2),
        Error::Searching(_) => ExitCode::from(3),
    }
}
