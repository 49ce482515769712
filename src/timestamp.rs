use std::str;

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::config::SearchConfig;
use crate::error::FormatError;
use crate::line_locator::LogLine;

/// Timestamps are wall-clock values with one second resolution.
pub type Timestamp = NaiveDateTime;

const ENGLISH_MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Month abbreviations in calendar order, matched case-insensitively.
///
/// # Examples
///
/// ```
/// use tgrep::MonthTable;
///
/// let months = MonthTable::default();
/// assert_eq!(months.lookup("Feb"), Some(2));
/// assert_eq!(months.lookup("DEC"), Some(12));
/// assert_eq!(months.lookup("Febr"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthTable {
    names: Vec<String>,
}

impl MonthTable {
    /// Builds a table from twelve names, January first.
    pub fn new(names: [&str; 12]) -> Self {
        Self {
            names: names.iter().map(|name| name.to_ascii_lowercase()).collect(),
        }
    }

    /// Returns the month number (1-12) for `name`.
    pub fn lookup(&self, name: &str) -> Option<u32> {
        self.names
            .iter()
            .position(|known| known.eq_ignore_ascii_case(name))
            .map(|idx| idx as u32 + 1)
    }
}

impl Default for MonthTable {
    fn default() -> Self {
        Self::new(ENGLISH_MONTHS)
    }
}

/// Extracts timestamps from log lines of the form
/// `<month> <day> <HH:MM:SS> <message>`.
///
/// The log carries no year. It is completed from the year context, with a
/// wraparound at new year: a January line read in December belongs to the
/// following year, a December line read in January to the previous one.
#[derive(Debug, Clone)]
pub struct TimestampParser {
    year_context: NaiveDate,
    months: MonthTable,
}

impl TimestampParser {
    pub fn new(year_context: NaiveDate, months: MonthTable) -> Self {
        Self { year_context, months }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(config.today, config.months.clone())
    }

    pub fn year_context(&self) -> NaiveDate {
        self.year_context
    }

    /// Parses the timestamp of a located line.
    pub fn parse(&self, line: &LogLine) -> Result<Timestamp, FormatError> {
        self.parse_bytes(line.raw(), line.start())
    }

    /// Parses raw line bytes. `offset` is only used to report failures.
    pub fn parse_bytes(&self, raw: &[u8], offset: u64) -> Result<Timestamp, FormatError> {
        let malformed = |reason: String| FormatError::MalformedLine {
            offset,
            line: String::from_utf8_lossy(raw).into_owned(),
            reason,
        };

        let mut fields = raw
            .split(|b| b.is_ascii_whitespace())
            .filter(|field| !field.is_empty());
        let (month, day, time) = match (fields.next(), fields.next(), fields.next(), fields.next()) {
            (Some(month), Some(day), Some(time), Some(_message)) => (month, day, time),
            _ => return Err(malformed("expected `<month> <day> <HH:MM:SS> <message>`".into())),
        };

        let month_name =
            str::from_utf8(month).map_err(|_| malformed("month is not valid UTF-8".into()))?;
        let month = self
            .months
            .lookup(month_name)
            .ok_or_else(|| malformed(format!("unknown month `{month_name}`")))?;
        let day = parse_number(day).ok_or_else(|| malformed("day is not a number".into()))?;

        let mut hms = time.split(|&b| b == b':');
        let (hour, minute, second) = match (hms.next(), hms.next(), hms.next(), hms.next()) {
            (Some(h), Some(m), Some(s), None) => (parse_number(h), parse_number(m), parse_number(s)),
            _ => return Err(malformed("time is not HH:MM:SS".into())),
        };
        let (hour, minute, second) = match (hour, minute, second) {
            (Some(h), Some(m), Some(s)) => (h, m, s),
            _ => return Err(malformed("time is not HH:MM:SS".into())),
        };

        let year = self.resolve_year(month);
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, minute, second))
            .ok_or_else(|| malformed(format!("no such time {year}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}")))
    }

    fn resolve_year(&self, month: u32) -> i32 {
        let context = self.year_context;
        match (context.month(), month) {
            (12, 1) => context.year() + 1,
            (1, 12) => context.year() - 1,
            _ => context.year(),
        }
    }
}

fn parse_number(field: &[u8]) -> Option<u32> {
    if field.is_empty() || field.len() > 4 || !field.iter().all(u8::is_ascii_digit) {
        return None;
    }
    field
        .iter()
        .try_fold(0u32, |acc, &digit| acc.checked_mul(10)?.checked_add(u32::from(digit - b'0')))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser(y: i32, m: u32, d: u32) -> TimestampParser {
        TimestampParser::new(NaiveDate::from_ymd_opt(y, m, d).unwrap(), MonthTable::default())
    }

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(y, mo, d).unwrap().and_hms_opt(h, mi, s).unwrap()
    }

    #[test]
    fn test_collapses_whitespace_runs() {
        let ts = parser(2011, 2, 9)
            .parse_bytes(b"Feb  9 \t07:05:03 web1 haproxy[123]: GET /", 0)
            .unwrap();
        assert_eq!(ts, at(2011, 2, 9, 7, 5, 3));
    }

    #[test]
    fn test_month_case_insensitive() {
        let p = parser(2011, 2, 9);
        assert_eq!(p.parse_bytes(b"FEB 9 00:00:00 x", 0).unwrap(), at(2011, 2, 9, 0, 0, 0));
        assert_eq!(p.parse_bytes(b"fEb 9 00:00:00 x", 0).unwrap(), at(2011, 2, 9, 0, 0, 0));
    }

    #[test]
    fn test_year_wraparound() {
        let december = parser(2011, 12, 31);
        assert_eq!(december.parse_bytes(b"Jan 1 00:00:01 x", 0).unwrap(), at(2012, 1, 1, 0, 0, 1));
        assert_eq!(december.parse_bytes(b"Dec 31 23:59:59 x", 0).unwrap(), at(2011, 12, 31, 23, 59, 59));

        let january = parser(2012, 1, 1);
        assert_eq!(january.parse_bytes(b"Dec 31 23:59:59 x", 0).unwrap(), at(2011, 12, 31, 23, 59, 59));
        assert_eq!(january.parse_bytes(b"Jan 1 00:00:01 x", 0).unwrap(), at(2012, 1, 1, 0, 0, 1));

        let june = parser(2012, 6, 1);
        assert_eq!(june.parse_bytes(b"Dec 31 23:59:59 x", 0).unwrap(), at(2012, 12, 31, 23, 59, 59));
    }

    #[test]
    fn test_rejects_malformed_lines() {
        let p = parser(2011, 2, 9);
        for line in [
            &b""[..],
            b"Feb 9 10:00:00",
            b"Fbr 9 10:00:00 x",
            b"Feb nine 10:00:00 x",
            b"Feb 9 10:00 x",
            b"Feb 9 10:00:00:00 x",
            b"Feb 9 25:00:00 x",
            b"Feb 30 10:00:00 x",
        ] {
            let err = p.parse_bytes(line, 42).unwrap_err();
            match err {
                FormatError::MalformedLine { offset, .. } => assert_eq!(offset, 42),
                other => panic!("unexpected error {other:?}"),
            }
        }
    }

    #[test]
    fn test_injected_month_table() {
        let months = MonthTable::new([
            "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sep", "oct", "nov", "dic",
        ]);
        let p = TimestampParser::new(NaiveDate::from_ymd_opt(2011, 8, 1).unwrap(), months);
        assert_eq!(p.parse_bytes(b"Ago 3 12:00:00 x", 0).unwrap(), at(2011, 8, 3, 12, 0, 0));
        assert!(p.parse_bytes(b"Aug 3 12:00:00 x", 0).is_err());
    }
}
