use super::window::{Day, Window};
use crate::catalog::Interval;

/// Floor `ms` to the nearest multiple of `step_ms`, measured from the Unix
/// epoch (spec §4.2, and spec §8 invariant 2: "every returned open-time is a
/// multiple of the interval, measured from Unix epoch").
#[must_use]
pub fn floor(ms: i64, step_ms: i64) -> i64 {
    ms.div_euclid(step_ms) * step_ms
}

/// Align `window` to `interval` boundaries.
///
/// `start' = floor(start, interval)`, `end' = floor(end, interval)`; if
/// `end' == start'` the minimum non-empty aligned window is one interval
/// (spec §4.2). This single floor-both-endpoints rule is what keeps the
/// alignment idempotent and gap detection monotonic — see spec §4.2's
/// rationale for why a ceiling-start/floor-end rule historically produced
/// `start > end` for sub-interval windows (spec §9 Open Questions, spec §8
/// scenario S5).
#[must_use]
pub fn align(window: Window, interval: Interval) -> Window {
    let step = interval.millis();
    let start = floor(window.start_ms, step);
    let mut end = floor(window.end_ms, step);
    if end == start {
        end = start + step;
    }
    Window {
        start_ms: start,
        end_ms: end,
    }
}

/// The UTC day containing instant `ms`.
#[must_use]
pub fn day_of(ms: i64) -> Day {
    Day(floor(ms, 86_400_000))
}

/// The ordered set of UTC days intersecting `window` (spec §4.2
/// `days_covering`).
#[must_use]
pub fn days_covering(window: Window) -> Vec<Day> {
    if window.is_empty() {
        return Vec::new();
    }
    let first = day_of(window.start_ms);
    // `end_ms` is exclusive; a window ending exactly on a day boundary does
    // not cover that next day.
    let last = day_of(window.end_ms - 1);
    let mut days = Vec::new();
    let mut cur = first.start_ms();
    while cur <= last.start_ms() {
        days.push(Day(cur));
        cur += 86_400_000;
    }
    days
}

/// Expected bar count for a full closed day at `interval` (spec §4.2).
#[must_use]
pub fn expected_count(interval: Interval) -> i64 {
    86_400_000 / interval.millis()
}

/// Expected bar count for the (possibly partial) intersection of `day` with
/// `window` at `interval`.
#[must_use]
pub fn expected_count_in_window(day: Day, window: Window, interval: Interval) -> i64 {
    let day_window = Window {
        start_ms: day.start_ms(),
        end_ms: day.end_ms(),
    };
    let clipped = day_window.clamp_to(&window);
    if clipped.is_empty() {
        return 0;
    }
    (clipped.end_ms - clipped.start_ms) / interval.millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn parse(s: &str) -> chrono::DateTime<Utc> {
        chrono::DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn w(s: &str, e: &str) -> Window {
        Window::new(parse(s), parse(e)).unwrap()
    }

    #[test]
    fn short_window_aligns_to_one_interval() {
        // spec §8 scenario S5
        let window = w("2025-06-02T19:30:00Z", "2025-06-02T20:00:00Z");
        let aligned = align(window, Interval::Hour1);
        let expected_start = parse("2025-06-02T19:00:00Z");
        let expected_end = parse("2025-06-02T20:00:00Z");
        assert_eq!(aligned.start_ms, expected_start.timestamp_millis());
        assert_eq!(aligned.end_ms, expected_end.timestamp_millis());
        assert!(aligned.start_ms < aligned.end_ms);
    }

    #[test]
    fn days_covering_excludes_exclusive_end_boundary() {
        let window = w("2024-01-15T00:00:00Z", "2024-01-16T00:00:00Z");
        let days = days_covering(window);
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].0, window.start_ms);
    }

    #[test]
    fn days_covering_spans_multiple_days() {
        let window = w("2024-01-15T12:00:00Z", "2024-01-17T06:00:00Z");
        assert_eq!(days_covering(window).len(), 3);
    }

    #[test]
    fn expected_count_full_day() {
        assert_eq!(expected_count(Interval::Hour1), 24);
        assert_eq!(expected_count(Interval::Min1), 1_440);
    }
}
