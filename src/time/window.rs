use chrono::{DateTime, NaiveDate, TimeZone, Utc};

/// A half-open `[start, end)` request range in UTC (spec §3 "Window").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl Window {
    /// Construct from UTC instants. Returns `None` if `start >= end`
    /// (spec §7 `invalid-input`: "`start ≥ end`").
    #[must_use]
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        let start_ms = start.timestamp_millis();
        let end_ms = end.timestamp_millis();
        (start_ms < end_ms).then_some(Self { start_ms, end_ms })
    }

    #[must_use]
    pub fn start(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.start_ms).single().expect("valid ms")
    }

    #[must_use]
    pub fn end(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.end_ms).single().expect("valid ms")
    }

    /// Clip `self` to the intersection with `other`. May return an empty
    /// (`start >= end`) window if the two do not overlap; check
    /// [`Window::is_empty`] before using the result.
    #[must_use]
    pub fn clamp_to(&self, other: &Window) -> Window {
        Window {
            start_ms: self.start_ms.max(other.start_ms),
            end_ms: self.end_ms.min(other.end_ms),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start_ms >= self.end_ms
    }
}

/// A day, identified by its UTC midnight instant in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Day(pub i64);

impl Day {
    #[must_use]
    pub fn start_ms(self) -> i64 {
        self.0
    }

    #[must_use]
    pub fn end_ms(self) -> i64 {
        self.0 + 86_400_000
    }

    #[must_use]
    pub fn date(self) -> NaiveDate {
        Utc.timestamp_millis_opt(self.0)
            .single()
            .expect("valid ms")
            .date_naive()
    }

    /// Whether this day is strictly in the past relative to `now` (spec §4.4
    /// `put`: "the day is closed (D < today-UTC)").
    #[must_use]
    pub fn is_closed(self, now: DateTime<Utc>) -> bool {
        self.end_ms() <= now.timestamp_millis()
    }

    #[must_use]
    pub fn format_ymd(self) -> String {
        self.date().format("%Y-%m-%d").to_string()
    }
}
