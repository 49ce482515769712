use std::cmp::Ordering;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use tracing::{debug, trace};

use crate::config::SearchConfig;
use crate::error::{Error, Result};
use crate::line_locator::{LineLocator, LogLine};
use crate::log_reader::LogReader;
use crate::pattern::TimePattern;
use crate::rollover::{RolloverResolver, TimeWindow};
use crate::timestamp::{Timestamp, TimestampParser};

/// Byte ranges of the log that matched, one per matching window.
///
/// Each range is half-open, `start..end`, and both ends are line starts (or
/// the file length). Ranges appear in window order and are not merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    ranges: Vec<(u64, u64)>,
}

impl SearchResult {
    pub fn ranges(&self) -> &[(u64, u64)] {
        &self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Number of matched bytes across all ranges. A cheap size hint for the
    /// amount of output before any line is read.
    pub fn byte_len(&self) -> u64 {
        self.ranges.iter().map(|(start, end)| end - start).sum()
    }
}

/// Binary search over a chronologically ordered text log.
///
/// The searcher owns the log stream for its whole life. Lines must be sorted
/// by timestamp (equal timestamps may repeat); each lookup costs a logarithmic
/// number of probes plus a walk over the run of lines sharing the boundary
/// timestamp.
///
/// # Examples
///
/// ```
/// use std::io::Cursor;
/// use chrono::NaiveDate;
/// use tgrep::{LogSearcher, SearchConfig};
///
/// let log = "Feb 9 10:00:00 a\nFeb 9 10:01:00 b\nFeb 9 10:01:30 c\nFeb 9 10:02:00 d\n";
/// let config = SearchConfig::default().with_today(NaiveDate::from_ymd_opt(2011, 2, 9).unwrap());
/// let mut searcher = LogSearcher::new(Cursor::new(log), config).unwrap();
///
/// let result = searcher.search_str("10:01").unwrap();
/// let lines: Vec<String> = searcher
///     .lines(&result)
///     .map(|line| line.unwrap().to_string())
///     .collect();
/// assert_eq!(lines, ["Feb 9 10:01:00 b", "Feb 9 10:01:30 c"]);
/// ```
pub struct LogSearcher<R> {
    locator: LineLocator<R>,
    parser: TimestampParser,
    resolver: RolloverResolver,
}

impl LogSearcher<File> {
    /// Opens the log at `path`. Fails before any search if it is unreadable.
    pub fn open(path: impl AsRef<Path>, config: SearchConfig) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "opened log");
        Self::new(file, config)
    }
}

impl<R: Read + Seek> LogSearcher<R> {
    pub fn new(reader: R, config: SearchConfig) -> Result<Self> {
        Ok(Self {
            locator: LineLocator::new(reader, config.scan_chunk)?,
            parser: TimestampParser::from_config(&config),
            resolver: RolloverResolver::new(config.today),
        })
    }

    /// Size of the log in bytes.
    pub fn len(&self) -> u64 {
        self.locator.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locator.is_empty()
    }

    pub fn first_timestamp(&mut self) -> Result<Timestamp> {
        let line = self.locator.first_line()?;
        Ok(self.parser.parse(&line)?)
    }

    pub fn last_timestamp(&mut self) -> Result<Timestamp> {
        let line = self.locator.last_line()?;
        Ok(self.parser.parse(&line)?)
    }

    /// Expands `pattern` into the windows that overlap this log.
    ///
    /// Fails with [`Error::Searching`] when no interpretation of the pattern
    /// falls inside the log's span.
    pub fn windows(&mut self, pattern: &TimePattern) -> Result<Vec<TimeWindow>> {
        let first = self.first_timestamp()?;
        let last = self.last_timestamp()?;
        let windows = self.resolver.resolve(pattern, first, last);
        if windows.is_empty() {
            return Err(Error::Searching(format!(
                "{pattern} is outside the log, which runs from {first} to {last}"
            )));
        }
        Ok(windows)
    }

    /// Parses and runs a pattern such as `10:01` or `23:59-0:03`.
    pub fn search_str(&mut self, pattern: &str) -> Result<SearchResult> {
        let pattern = TimePattern::parse(pattern)?;
        self.search(&pattern)
    }

    pub fn search(&mut self, pattern: &TimePattern) -> Result<SearchResult> {
        let windows = self.windows(pattern)?;
        let mut ranges = Vec::with_capacity(windows.len());
        for window in &windows {
            if let Some(range) = self.search_window(window)? {
                ranges.push(range);
            }
        }
        Ok(SearchResult { ranges })
    }

    /// Resolves one window to a non-empty byte range, or `None` when no line
    /// falls inside it.
    pub fn search_window(&mut self, window: &TimeWindow) -> Result<Option<(u64, u64)>> {
        let Some(start) = self.find_start(window)? else {
            debug!(%window, "no exact match");
            return Ok(None);
        };
        let end = self.find_end(window, start)?;
        debug!(%window, start, end, "window resolved");
        Ok((end > start).then_some((start, end)))
    }

    /// Offset of the first line whose timestamp is not before the window
    /// start.
    ///
    /// Exact windows return `None` unless a line carries exactly that
    /// timestamp. Range windows always return an offset, which is the file
    /// length when every line is earlier.
    pub fn find_start(&mut self, window: &TimeWindow) -> Result<Option<u64>> {
        let target = window.start();
        // Both fences sit on line boundaries. Lines before `lower` are
        // earlier than the target, lines from `upper` on are later.
        let mut lower = 0;
        let mut upper = self.locator.len();
        while lower < upper {
            let mid = lower + (upper - lower) / 2;
            let line = self.locator.locate(mid)?;
            let ts = self.parser.parse(&line)?;
            trace!(lower, upper, mid, line = line.start(), %ts, "find_start probe");
            match ts.cmp(&target) {
                Ordering::Less => lower = line.end().min(upper),
                Ordering::Greater => upper = line.start(),
                Ordering::Equal => return self.first_of_run(line, target, lower).map(Some),
            }
        }

        if window.is_exact() {
            return Ok(None);
        }
        Ok(Some(lower))
    }

    /// Offset just past the last line whose timestamp is not after the
    /// window end, searching from `start_offset` (a line start, normally the
    /// result of [`find_start`](Self::find_start)).
    pub fn find_end(&mut self, window: &TimeWindow, start_offset: u64) -> Result<u64> {
        let target = window.end();
        let mut lower = start_offset;
        let mut upper = self.locator.len();
        while lower < upper {
            let mid = lower + (upper - lower) / 2;
            let line = self.locator.locate(mid)?;
            let ts = self.parser.parse(&line)?;
            trace!(lower, upper, mid, line = line.start(), %ts, "find_end probe");
            match ts.cmp(&target) {
                Ordering::Less => lower = line.end().min(upper),
                Ordering::Greater => upper = line.start(),
                Ordering::Equal => return self.last_of_run(line, target),
            }
        }
        Ok(lower)
    }

    /// Returns a lazy reader over every line in `result`.
    ///
    /// Each call starts over from the first range.
    pub fn lines<'a>(&'a mut self, result: &'a SearchResult) -> LogReader<'a, R> {
        LogReader::new(&mut self.locator, result.ranges())
    }

    /// Walks back through lines sharing `target` until the run starts, never
    /// crossing `floor`.
    fn first_of_run(&mut self, mut line: LogLine, target: Timestamp, floor: u64) -> Result<u64> {
        while line.start() > floor {
            let Some(prev) = self.locator.prev_line(&line)? else {
                break;
            };
            if self.parser.parse(&prev)? != target {
                break;
            }
            line = prev;
        }
        Ok(line.start())
    }

    /// Walks forward through lines sharing `target` and returns the end of
    /// the last one.
    fn last_of_run(&mut self, mut line: LogLine, target: Timestamp) -> Result<u64> {
        while let Some(next) = self.locator.next_line(&line)? {
            if self.parser.parse(&next)? != target {
                break;
            }
            line = next;
        }
        Ok(line.end())
    }
}
