use std::path::PathBuf;

use crate::catalog::{Interval, MarketClass, Provider};
use crate::time::Day;

/// `(provider, market, symbol, interval, date)` — the sole addressing
/// primitive for cache lookups (spec §3 "CacheKey").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub provider: Provider,
    pub market: MarketClass,
    pub symbol: String,
    pub interval: Interval,
    pub day: Day,
}

impl CacheKey {
    /// Deterministic filesystem path (spec §3, §6):
    /// `<cache_root>/<provider>/<market>/klines/daily/<SYMBOL>/<interval>/<YYYY-MM-DD>.<ext>`
    #[must_use]
    pub fn path(&self, cache_root: &std::path::Path, ext: &str) -> PathBuf {
        cache_root
            .join(self.provider.name())
            .join(self.market.canonical_path_segment())
            .join("klines")
            .join("daily")
            .join(&self.symbol)
            .join(self.interval.canonical_name())
            .join(format!("{}.{ext}", self.day.format_ymd()))
    }

    #[must_use]
    pub fn display(&self) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            self.provider,
            self.market,
            self.symbol,
            self.interval,
            self.day.format_ymd()
        )
    }
}
