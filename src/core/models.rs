use serde::{Deserialize, Serialize};

/// One candlestick record (spec §3 "Bar"). `open_time` is the *start* of the
/// covered interval; the bar's closed interval is `[open_time, open_time +
/// interval)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub open_time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Whether this bar satisfies the data-model invariants in spec §3:
    /// finite OHLCV, non-negative volume, `high >= max(open, close)`,
    /// `low <= min(open, close)`.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        [self.open, self.high, self.low, self.close, self.volume]
            .iter()
            .all(|v| v.is_finite())
            && self.volume >= 0.0
            && self.high >= self.open.max(self.close)
            && self.low <= self.open.min(self.close)
    }
}

/// A dense or available-only time series returned by the public façade
/// (spec §6 "Output contract"). Deliberately a concrete struct of parallel
/// columns rather than a dynamically-typed table — see spec §9's design
/// note on "dynamic typing / opaque tabular handles".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BarSeries {
    pub open_time: Vec<i64>,
    pub open: Vec<Option<f64>>,
    pub high: Vec<Option<f64>>,
    pub low: Vec<Option<f64>>,
    pub close: Vec<Option<f64>>,
    pub volume: Vec<Option<f64>>,
}

impl BarSeries {
    #[must_use]
    pub fn len(&self) -> usize {
        self.open_time.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.open_time.is_empty()
    }

    /// Fraction of rows with null OHLCV (spec §4.9 `auto_reindex` warning
    /// threshold).
    #[must_use]
    pub fn missing_fraction(&self) -> f64 {
        if self.open_time.is_empty() {
            return 0.0;
        }
        let missing = self.open.iter().filter(|v| v.is_none()).count();
        missing as f64 / self.open_time.len() as f64
    }

    /// Build a dense series at every interval step across `window`, with
    /// null OHLCV for open-times not present in `bars` (spec §4.9
    /// `auto_reindex = true`).
    #[must_use]
    pub fn dense_reindex(bars: &[Bar], window: crate::time::Window, interval: crate::catalog::Interval) -> Self {
        let step = interval.millis();
        let mut by_time = std::collections::HashMap::with_capacity(bars.len());
        for b in bars {
            by_time.insert(b.open_time, *b);
        }
        let mut series = Self::default();
        let mut t = window.start_ms;
        while t < window.end_ms {
            series.open_time.push(t);
            match by_time.get(&t) {
                Some(b) => {
                    series.open.push(Some(b.open));
                    series.high.push(Some(b.high));
                    series.low.push(Some(b.low));
                    series.close.push(Some(b.close));
                    series.volume.push(Some(b.volume));
                }
                None => {
                    series.open.push(None);
                    series.high.push(None);
                    series.low.push(None);
                    series.close.push(None);
                    series.volume.push(None);
                }
            }
            t += step;
        }
        series
    }

    /// Build an available-only series from `bars`, already clipped and
    /// sorted by the caller (spec §4.9 `auto_reindex = false`).
    #[must_use]
    pub fn available_only(bars: &[Bar]) -> Self {
        let mut series = Self {
            open_time: Vec::with_capacity(bars.len()),
            open: Vec::with_capacity(bars.len()),
            high: Vec::with_capacity(bars.len()),
            low: Vec::with_capacity(bars.len()),
            close: Vec::with_capacity(bars.len()),
            volume: Vec::with_capacity(bars.len()),
        };
        for b in bars {
            series.open_time.push(b.open_time);
            series.open.push(Some(b.open));
            series.high.push(Some(b.high));
            series.low.push(Some(b.low));
            series.close.push(Some(b.close));
            series.volume.push(Some(b.volume));
        }
        series
    }
}

/// Sort `bars` by open-time and drop duplicate open-times, keeping the
/// later occurrence in the input order (spec §4.7/§4.8: "Duplicates within
/// a single source are defensively removed, preferring the later record").
#[must_use]
pub fn sort_dedup_keep_last(mut bars: Vec<Bar>) -> Vec<Bar> {
    // Stable sort by open_time; ties keep relative input order, so the
    // "last write wins" rule below keeps whichever occurrence came later in
    // `bars`.
    bars.sort_by_key(|b| b.open_time);
    let mut out: Vec<Bar> = Vec::with_capacity(bars.len());
    for bar in bars {
        if let Some(last) = out.last_mut() {
            if last.open_time == bar.open_time {
                *last = bar;
                continue;
            }
        }
        out.push(bar);
    }
    out
}
