//! Property-based tests for the range search
//!
//! Uses proptest to check the search against a brute-force filter over
//! randomly generated, sorted logs.

use std::io::Cursor;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use tgrep::{LineLocator, LogSearcher, SearchConfig, TimeWindow};

// ============================================================================
// Strategy Generators
// ============================================================================

fn base() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2011, 2, 9).unwrap().and_hms_opt(0, 0, 0).unwrap()
}

/// A sorted log: each entry is (seconds since base, message length).
/// Small gaps give long runs of equal timestamps.
fn log_strategy() -> impl Strategy<Value = Vec<(i64, usize)>> {
    prop::collection::vec((0..=3i64, 0..40usize), 1..120).prop_map(|steps| {
        let mut secs = 0;
        steps
            .into_iter()
            .map(|(gap, len)| {
                secs += gap;
                (secs, len)
            })
            .collect()
    })
}

struct Built {
    text: String,
    stamps: Vec<NaiveDateTime>,
    starts: Vec<u64>,
}

fn build(entries: &[(i64, usize)], trailing_newline: bool) -> Built {
    let mut text = String::new();
    let mut stamps = Vec::new();
    let mut starts = Vec::new();
    for (i, &(secs, len)) in entries.iter().enumerate() {
        let ts = base() + Duration::seconds(secs);
        starts.push(text.len() as u64);
        // %e pads single-digit days with a space, exercising the collapse.
        text.push_str(&format!("{} m{} {}\n", ts.format("%b %e %H:%M:%S"), i, "x".repeat(len)));
        stamps.push(ts);
    }
    if !trailing_newline {
        text.pop();
    }
    Built { text, stamps, starts }
}

fn searcher(text: &str, chunk: usize) -> LogSearcher<Cursor<Vec<u8>>> {
    let config = SearchConfig::default()
        .with_today(base().date())
        .with_scan_chunk(chunk);
    LogSearcher::new(Cursor::new(text.as_bytes().to_vec()), config).unwrap()
}

/// Indices of the lines whose timestamps fall inside `[start, end]`.
fn expected(stamps: &[NaiveDateTime], start: NaiveDateTime, end: NaiveDateTime) -> Vec<usize> {
    (0..stamps.len())
        .filter(|&i| start <= stamps[i] && stamps[i] <= end)
        .collect()
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Range search returns exactly the lines inside the window, as one
    /// contiguous byte range.
    #[test]
    fn range_search_matches_filter(
        entries in log_strategy(),
        a in -5i64..400,
        span in 0i64..60,
        chunk in 1usize..64,
        trailing in any::<bool>(),
    ) {
        let built = build(&entries, trailing);
        let start = base() + Duration::seconds(a);
        let end = start + Duration::seconds(span);
        let window = TimeWindow::range(start, end).unwrap();

        let mut s = searcher(&built.text, chunk);
        let range = s.search_window(&window).unwrap();
        let want = expected(&built.stamps, start, end);

        match range {
            None => prop_assert!(want.is_empty()),
            Some((from, to)) => {
                prop_assert!(!want.is_empty());
                prop_assert_eq!(from, built.starts[want[0]]);
                let last = *want.last().unwrap();
                let want_end = built.starts.get(last + 1).copied().unwrap_or(built.text.len() as u64);
                prop_assert_eq!(to, want_end);
            }
        }
    }

    /// Exact search finds the whole run of a present timestamp, and nothing
    /// for an absent one.
    #[test]
    fn exact_search_finds_whole_run(
        entries in log_strategy(),
        probe in 0i64..400,
        chunk in 1usize..64,
    ) {
        let built = build(&entries, true);
        let at = base() + Duration::seconds(probe);
        let window = TimeWindow::exact(at);

        let mut s = searcher(&built.text, chunk);
        let want = expected(&built.stamps, at, at);
        let start = s.find_start(&window).unwrap();

        if want.is_empty() {
            prop_assert_eq!(start, None);
        } else {
            let first = built.starts[want[0]];
            prop_assert_eq!(start, Some(first));
            let last = *want.last().unwrap();
            let end = s.find_end(&window, first).unwrap();
            prop_assert_eq!(end, built.starts.get(last + 1).copied().unwrap_or(built.text.len() as u64));
        }
    }

    /// Every offset inside a line locates that line's start, whatever the
    /// scan chunk size.
    #[test]
    fn locate_is_stable_within_a_line(
        entries in log_strategy(),
        chunk in 1usize..64,
        trailing in any::<bool>(),
    ) {
        let built = build(&entries, trailing);
        let len = built.text.len() as u64;
        let mut locator = LineLocator::new(Cursor::new(built.text.into_bytes()), chunk).unwrap();

        for (i, &start) in built.starts.iter().enumerate() {
            let end = built.starts.get(i + 1).copied().unwrap_or(len);
            for offset in [start, start + (end - start) / 2, end - 1] {
                let line = locator.locate(offset).unwrap();
                prop_assert_eq!(line.start(), start);
                prop_assert_eq!(line.end(), end);
                // Locating again from inside the returned line is a fixed point.
                let again = locator.locate(line.end() - 1).unwrap();
                prop_assert_eq!(again.start(), start);
            }
        }
        prop_assert_eq!(locator.locate(len).unwrap().start(), *built.starts.last().unwrap());
    }

    /// Repeating a search on the same log gives the same answer.
    #[test]
    fn search_is_idempotent(
        entries in log_strategy(),
        a in 0i64..400,
        span in 0i64..30,
    ) {
        let built = build(&entries, true);
        let start = base() + Duration::seconds(a);
        let window = TimeWindow::range(start, start + Duration::seconds(span)).unwrap();

        let mut s = searcher(&built.text, 16);
        let first = s.search_window(&window).unwrap();
        let second = s.search_window(&window).unwrap();
        prop_assert_eq!(first, second);
    }
}
