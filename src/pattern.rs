use std::fmt;
use std::str::FromStr;

use chrono::NaiveTime;
use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::error::FormatError;

lazy_static! {
    /// Every accepted pattern: `H:MM`, `H:MM:SS` or a dash-joined pair.
    static ref PATTERN: Regex = Regex::new(
        r"^(\d{1,2}):(\d{1,2})(?::(\d{1,2}))?(?:-(\d{1,2}):(\d{1,2})(?::(\d{1,2}))?)?$"
    )
    .expect("pattern regex is valid");
}

/// A bare time of day, or a range of them, as typed by the caller.
///
/// A bound without seconds is a wildcard over the minute: `:00` as a lower
/// bound and `:59` as an upper bound. A single `H:MM:SS` is an exact search;
/// anything else is a range search.
///
/// # Examples
///
/// ```
/// use chrono::NaiveTime;
/// use tgrep::TimePattern;
///
/// let p: TimePattern = "23:59-0:03".parse().unwrap();
/// assert_eq!(p.start(), NaiveTime::from_hms_opt(23, 59, 0).unwrap());
/// assert_eq!(p.end(), NaiveTime::from_hms_opt(0, 3, 59).unwrap());
/// assert!(p.spans_midnight());
/// assert!(!p.is_exact());
///
/// assert!("8:42:04".parse::<TimePattern>().unwrap().is_exact());
/// assert!("8:42:04pm".parse::<TimePattern>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimePattern {
    start: NaiveTime,
    end: NaiveTime,
    exact: bool,
}

impl TimePattern {
    pub fn parse(pattern: &str) -> Result<Self, FormatError> {
        let caps = PATTERN
            .captures(pattern.trim())
            .ok_or_else(|| FormatError::InvalidPattern(pattern.to_string()))?;

        let start = time_at(pattern, &caps, 1, 0)?;
        if caps.get(4).is_none() {
            return Ok(match caps.get(3) {
                Some(_) => Self {
                    start,
                    end: start,
                    exact: true,
                },
                None => Self {
                    start,
                    end: time_at(pattern, &caps, 1, 59)?,
                    exact: false,
                },
            });
        }

        Ok(Self {
            start,
            end: time_at(pattern, &caps, 4, 59)?,
            exact: false,
        })
    }

    /// Lower bound, inclusive.
    pub fn start(&self) -> NaiveTime {
        self.start
    }

    /// Upper bound, inclusive.
    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// Whether a miss must be reported as "no match" instead of the closest
    /// available lines.
    pub fn is_exact(&self) -> bool {
        self.exact
    }

    pub fn spans_midnight(&self) -> bool {
        self.start > self.end
    }
}

impl FromStr for TimePattern {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TimePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.exact {
            write!(f, "{}", self.start.format("%H:%M:%S"))
        } else {
            write!(f, "{}-{}", self.start.format("%H:%M:%S"), self.end.format("%H:%M:%S"))
        }
    }
}

/// Builds the time from the hour/minute/second groups starting at `first`,
/// using `default_second` when the seconds group is absent.
fn time_at(
    pattern: &str,
    caps: &Captures<'_>,
    first: usize,
    default_second: u32,
) -> Result<NaiveTime, FormatError> {
    let component = |idx: usize, name: &'static str, max: u32| -> Result<Option<u32>, FormatError> {
        let Some(m) = caps.get(idx) else {
            return Ok(None);
        };
        // At most two ASCII digits, guaranteed by the regex.
        let value: u32 = m
            .as_str()
            .parse()
            .map_err(|_| FormatError::InvalidPattern(pattern.to_string()))?;
        if value > max {
            return Err(FormatError::ComponentOutOfRange {
                pattern: pattern.to_string(),
                component: name,
                value,
            });
        }
        Ok(Some(value))
    };

    let hour = component(first, "hour", 23)?.unwrap_or(0);
    let minute = component(first + 1, "minute", 59)?.unwrap_or(0);
    let second = component(first + 2, "second", 59)?.unwrap_or(default_second);
    NaiveTime::from_hms_opt(hour, minute, second)
        .ok_or_else(|| FormatError::InvalidPattern(pattern.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hms(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn test_single_minute_is_wildcard_range() {
        let p = TimePattern::parse("10:01").unwrap();
        assert_eq!((p.start(), p.end()), (hms(10, 1, 0), hms(10, 1, 59)));
        assert!(!p.is_exact());
    }

    #[test]
    fn test_exact() {
        let p = TimePattern::parse("8:42:04").unwrap();
        assert_eq!((p.start(), p.end()), (hms(8, 42, 4), hms(8, 42, 4)));
        assert!(p.is_exact());
    }

    #[test]
    fn test_ranges_mix_precision() {
        let p = TimePattern::parse("10:00:30-10:02").unwrap();
        assert_eq!((p.start(), p.end()), (hms(10, 0, 30), hms(10, 2, 59)));
        let p = TimePattern::parse("10:00-10:02:10").unwrap();
        assert_eq!((p.start(), p.end()), (hms(10, 0, 0), hms(10, 2, 10)));
        assert!(!p.is_exact());
        // A range with equal exact bounds is still a range search.
        assert!(!TimePattern::parse("1:02:03-1:02:03").unwrap().is_exact());
    }

    #[test]
    fn test_rejects_bad_patterns() {
        for bad in ["", "10", "10:", "100:00", "10:00-", "10:00:00:00", "a10:00", "10:00-11", "10:00 junk"] {
            assert!(
                matches!(TimePattern::parse(bad), Err(FormatError::InvalidPattern(_))),
                "pattern {bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_out_of_range_components() {
        assert!(matches!(
            TimePattern::parse("24:00"),
            Err(FormatError::ComponentOutOfRange { component: "hour", value: 24, .. })
        ));
        assert!(matches!(
            TimePattern::parse("10:00-10:60"),
            Err(FormatError::ComponentOutOfRange { component: "minute", value: 60, .. })
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(TimePattern::parse("8:42:04").unwrap().to_string(), "08:42:04");
        assert_eq!(TimePattern::parse("23:59-0:03").unwrap().to_string(), "23:59:00-00:03:59");
    }
}
