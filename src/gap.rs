//! Gap Analyzer (C7): given an aligned window and the bars already owned,
//! produces the ordered set of half-open sub-ranges still missing, split at
//! UTC-day boundaries so each sub-gap targets exactly one cache key (spec
//! §4.7).

use crate::catalog::Interval;
use crate::core::Bar;
use crate::time::{Window, days_covering};

/// One missing half-open sub-range, wholly contained within a single UTC
/// day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gap {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl Gap {
    #[must_use]
    pub fn window(&self) -> Window {
        Window { start_ms: self.start_ms, end_ms: self.end_ms }
    }
}

/// Ordered, non-overlapping set of gaps covering everything in `window`
/// that `owned` does not already account for.
#[must_use]
pub fn analyze(window: Window, interval: Interval, owned: &[Bar]) -> Vec<Gap> {
    let step = interval.millis();
    let mut raw = Vec::new();

    if owned.is_empty() {
        raw.push((window.start_ms, window.end_ms));
    } else {
        let first = owned[0].open_time;
        if first > window.start_ms {
            raw.push((window.start_ms, first));
        }
        for pair in owned.windows(2) {
            let end_of_prev = pair[0].open_time + step;
            let start_of_next = pair[1].open_time;
            if start_of_next > end_of_prev {
                raw.push((end_of_prev, start_of_next));
            }
        }
        let last = owned[owned.len() - 1].open_time + step;
        if last < window.end_ms {
            raw.push((last, window.end_ms));
        }
    }

    let clamped: Vec<(i64, i64)> = raw
        .into_iter()
        .map(|(s, e)| (s.max(window.start_ms), e.min(window.end_ms)))
        .filter(|(s, e)| s < e)
        .collect();

    day_decompose(&clamped)
}

fn day_decompose(ranges: &[(i64, i64)]) -> Vec<Gap> {
    let mut out = Vec::new();
    for &(start, end) in ranges {
        let span = Window { start_ms: start, end_ms: end };
        for day in days_covering(span) {
            let s = start.max(day.start_ms());
            let e = end.min(day.end_ms());
            if s < e {
                out.push(Gap { start_ms: s, end_ms: e });
            }
        }
    }
    out
}
