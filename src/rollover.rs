use std::fmt;

use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::error::{Error, Result};
use crate::pattern::TimePattern;
use crate::timestamp::Timestamp;

/// An absolute, inclusive span of time to search for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: Timestamp,
    end: Timestamp,
    exact: bool,
}

impl TimeWindow {
    /// A range window. Fails if `start` is later than `end`.
    pub fn range(start: Timestamp, end: Timestamp) -> Result<Self> {
        if start > end {
            return Err(Error::Searching(format!(
                "window start {start} is later than its end {end}"
            )));
        }
        Ok(Self {
            start,
            end,
            exact: false,
        })
    }

    /// A window for one precise second; a miss yields no match.
    pub fn exact(at: Timestamp) -> Self {
        Self {
            start: at,
            end: at,
            exact: true,
        }
    }

    pub fn start(&self) -> Timestamp {
        self.start
    }

    pub fn end(&self) -> Timestamp {
        self.end
    }

    pub fn is_exact(&self) -> bool {
        self.exact
    }

    /// Whether the window intersects `[first, last]`.
    pub fn overlaps(&self, first: Timestamp, last: Timestamp) -> bool {
        self.end >= first && self.start <= last
    }

    pub fn contains(&self, ts: Timestamp) -> bool {
        self.start <= ts && ts <= self.end
    }

    fn shifted(self, start_days: i64, end_days: i64) -> Self {
        Self {
            start: self.start + Duration::days(start_days),
            end: self.end + Duration::days(end_days),
            exact: self.exact,
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.exact {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{} - {}", self.start, self.end)
        }
    }
}

/// Turns a date-less [`TimePattern`] into the absolute windows it may mean.
///
/// The pattern is pinned to the configured "today". A pattern that wraps
/// past midnight may mean yesterday-into-today or today-into-tomorrow; any
/// other pattern may mean yesterday, today or tomorrow. Only the
/// interpretations that overlap the log's own span are kept.
#[derive(Debug, Clone, Copy)]
pub struct RolloverResolver {
    today: NaiveDate,
}

impl RolloverResolver {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Returns the candidate windows overlapping `[first_ts, last_ts]`,
    /// ordered by start time. The list may be empty.
    pub fn resolve(&self, pattern: &TimePattern, first_ts: Timestamp, last_ts: Timestamp) -> Vec<TimeWindow> {
        let base = TimeWindow {
            start: self.today.and_time(pattern.start()),
            end: self.today.and_time(pattern.end()),
            exact: pattern.is_exact(),
        };

        let candidates: Vec<TimeWindow> = if pattern.spans_midnight() {
            vec![base.shifted(-1, 0), base.shifted(0, 1)]
        } else {
            vec![base.shifted(-1, -1), base, base.shifted(1, 1)]
        };

        let mut windows: Vec<TimeWindow> = candidates
            .into_iter()
            .filter(|window| {
                let keep = window.overlaps(first_ts, last_ts);
                debug!(window = %window, keep, "rollover candidate");
                keep
            })
            .collect();
        windows.sort_by_key(|window| window.start);
        windows
    }
}
