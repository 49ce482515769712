//! # tgrep
//!
//! Time-range search over large, chronologically ordered text logs.
//!
//! Logs such as a web server's access log grow by appending, so their lines
//! are already sorted by timestamp. tgrep uses that to find the lines inside
//! a time of day (or a range of them) with a binary search over byte offsets
//! instead of reading the file from the top:
//!
//! * **Logarithmic lookups**: a handful of seeks per boundary, whatever the size
//! * **Duplicate-safe**: runs of lines sharing one second are resolved exactly
//! * **Rollover aware**: ranges across midnight and logs across new year work
//!
//! ## Main Components
//!
//! * `LineLocator`: maps any byte offset to the line containing it
//! * `TimestampParser`: reads `<month> <day> <HH:MM:SS>` and completes the year
//! * `TimePattern`: parses `H:MM`, `H:MM:SS` and `A-B` search patterns
//! * `RolloverResolver`: turns a time of day into absolute candidate windows
//! * `LogSearcher`: the binary search itself, `find_start` and `find_end`
//! * `LogReader`: streams the matched lines lazily
//!
//! ## Quick Start
//!
//! ```no_run
//! use tgrep::{LogSearcher, SearchConfig};
//!
//! let mut searcher = LogSearcher::open("/logs/haproxy.log", SearchConfig::default())?;
//! let result = searcher.search_str("23:59-0:03")?;
//! for line in searcher.lines(&result) {
//!     println!("{}", line?);
//! }
//! # Ok::<(), tgrep::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod line_locator;
pub mod log_reader;
pub mod pattern;
pub mod rollover;
pub mod search;
pub mod timestamp;

pub use config::SearchConfig;
pub use error::{Error, FormatError, Result};
pub use line_locator::{LineLocator, LogLine};
pub use log_reader::LogReader;
pub use pattern::TimePattern;
pub use rollover::{RolloverResolver, TimeWindow};
pub use search::{LogSearcher, SearchResult};
pub use timestamp::{MonthTable, Timestamp, TimestampParser};
