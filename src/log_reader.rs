use std::iter::FusedIterator;
use std::io::{Read, Seek};
use std::slice;

use tracing::trace;

use crate::error::Result;
use crate::line_locator::{LineLocator, LogLine};

/// Lazy reader over the lines of a [`SearchResult`](crate::SearchResult).
///
/// LogReader seeks to the start of each range in turn and reads whole lines
/// until it reaches the range end. Ranges are emitted exactly as given, so
/// overlapping ranges repeat their shared lines.
///
/// The reader borrows the log exclusively: nothing else can move the cursor
/// while it is alive, and a fresh reader always begins at the first range.
/// After the last line, or after an I/O error, it only returns `None`.
///
/// # Examples
///
/// ```
/// use std::io::Cursor;
/// use chrono::NaiveDate;
/// use tgrep::{LogSearcher, SearchConfig};
///
/// let log = "Feb 9 23:59:58 a\nFeb 10 00:00:01 b\n";
/// let config = SearchConfig::default().with_today(NaiveDate::from_ymd_opt(2011, 2, 10).unwrap());
/// let mut searcher = LogSearcher::new(Cursor::new(log), config).unwrap();
/// let result = searcher.search_str("23:59-0:00").unwrap();
///
/// let mut reader = searcher.lines(&result);
/// assert_eq!(reader.next().unwrap().unwrap().text(), "Feb 9 23:59:58 a");
/// assert_eq!(reader.next().unwrap().unwrap().text(), "Feb 10 00:00:01 b");
/// assert!(reader.next().is_none());
/// ```
pub struct LogReader<'a, R> {
    locator: &'a mut LineLocator<R>,
    ranges: slice::Iter<'a, (u64, u64)>,
    /// Next line start and the end of the range being read.
    current: Option<(u64, u64)>,
    done: bool,
}

impl<'a, R: Read + Seek> LogReader<'a, R> {
    pub(crate) fn new(locator: &'a mut LineLocator<R>, ranges: &'a [(u64, u64)]) -> Self {
        Self {
            locator,
            ranges: ranges.iter(),
            current: None,
            done: false,
        }
    }
}

impl<'a, R: Read + Seek> Iterator for LogReader<'a, R> {
    type Item = Result<LogLine>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let (pos, end) = match self.current {
                Some((pos, end)) if pos < end => (pos, end),
                _ => {
                    match self.ranges.next() {
                        Some(&(start, end)) => {
                            trace!(start, end, "reading range");
                            self.current = Some((start, end));
                        }
                        None => self.done = true,
                    }
                    continue;
                }
            };

            match self.locator.read_line_at(pos) {
                Ok(Some(line)) => {
                    self.current = Some((line.end(), end));
                    return Some(Ok(line));
                }
                // Range runs past the end of the stream.
                Ok(None) => self.current = None,
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }
        }
        None
    }
}

impl<'a, R: Read + Seek> FusedIterator for LogReader<'a, R> {}
