use std::fmt;

use super::MarketClass;

/// Supported kline intervals (spec §3 "Interval").
///
/// Each variant maps to a fixed millisecond duration and a canonical wire
/// name, mirroring the way the teacher's `history::params::Interval` pairs
/// an enum variant with `as_str()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interval {
    Sec1,
    Min1,
    Min3,
    Min5,
    Min15,
    Min30,
    Hour1,
    Hour2,
    Hour4,
    Hour6,
    Hour8,
    Hour12,
    Day1,
}

impl Interval {
    /// All intervals the catalog knows about, in ascending duration order.
    pub const ALL: [Interval; 13] = [
        Interval::Sec1,
        Interval::Min1,
        Interval::Min3,
        Interval::Min5,
        Interval::Min15,
        Interval::Min30,
        Interval::Hour1,
        Interval::Hour2,
        Interval::Hour4,
        Interval::Hour6,
        Interval::Hour8,
        Interval::Hour12,
        Interval::Day1,
    ];

    /// Duration in milliseconds.
    #[must_use]
    pub fn millis(self) -> i64 {
        match self {
            Self::Sec1 => 1_000,
            Self::Min1 => 60_000,
            Self::Min3 => 3 * 60_000,
            Self::Min5 => 5 * 60_000,
            Self::Min15 => 15 * 60_000,
            Self::Min30 => 30 * 60_000,
            Self::Hour1 => 3_600_000,
            Self::Hour2 => 2 * 3_600_000,
            Self::Hour4 => 4 * 3_600_000,
            Self::Hour6 => 6 * 3_600_000,
            Self::Hour8 => 8 * 3_600_000,
            Self::Hour12 => 12 * 3_600_000,
            Self::Day1 => 86_400_000,
        }
    }

    /// Canonical wire/path name (e.g. `1m`, `1h`, `1d`).
    #[must_use]
    pub fn canonical_name(self) -> &'static str {
        match self {
            Self::Sec1 => "1s",
            Self::Min1 => "1m",
            Self::Min3 => "3m",
            Self::Min5 => "5m",
            Self::Min15 => "15m",
            Self::Min30 => "30m",
            Self::Hour1 => "1h",
            Self::Hour2 => "2h",
            Self::Hour4 => "4h",
            Self::Hour6 => "6h",
            Self::Hour8 => "8h",
            Self::Hour12 => "12h",
            Self::Day1 => "1d",
        }
    }

    /// Whether `market` permits this interval (spec §3: "a market class may
    /// forbid specific intervals, e.g. 1s only on spot").
    #[must_use]
    pub fn allowed_for(self, market: MarketClass) -> bool {
        if self == Self::Sec1 {
            return market == MarketClass::Spot;
        }
        true
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

impl std::str::FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|i| i.canonical_name() == s)
            .ok_or_else(|| format!("unknown interval: {s}"))
    }
}

/// Ordered set of intervals permitted for `market` (spec §4.1 `intervals_for`).
#[must_use]
pub fn intervals_for(market: MarketClass) -> Vec<Interval> {
    Interval::ALL
        .into_iter()
        .filter(|i| i.allowed_for(market))
        .collect()
}
