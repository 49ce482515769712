use chrono::{Local, NaiveDate};

use crate::timestamp::MonthTable;

/// Default number of bytes read per step of the backward line scan.
pub const DEFAULT_SCAN_CHUNK: usize = 256;

/// Settings shared by every component of a search.
///
/// Nothing in the crate reads the wall clock on its own; the date treated as
/// "today" lives here so callers (and tests) decide which calendar day a bare
/// time of day refers to.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use tgrep::SearchConfig;
///
/// let today = NaiveDate::from_ymd_opt(2011, 2, 9).unwrap();
/// let config = SearchConfig::default().with_today(today);
/// assert_eq!(config.today, today);
/// ```
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// The day a bare time of day is anchored on. Its year is the year
    /// context used to complete log timestamps.
    pub today: NaiveDate,

    /// Month abbreviations recognised in log lines.
    pub months: MonthTable,

    /// Chunk size of the backward scan that finds a line start.
    pub scan_chunk: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            today: Local::now().date_naive(),
            months: MonthTable::default(),
            scan_chunk: DEFAULT_SCAN_CHUNK,
        }
    }
}

impl SearchConfig {
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn with_months(mut self, months: MonthTable) -> Self {
        self.months = months;
        self
    }

    /// Sets the backward scan chunk. Zero is bumped to one byte.
    pub fn with_scan_chunk(mut self, scan_chunk: usize) -> Self {
        self.scan_chunk = scan_chunk.max(1);
        self
    }
}
