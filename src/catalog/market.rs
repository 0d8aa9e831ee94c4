use std::fmt;

/// Binance market classes (spec §3 "Market class").
///
/// Constrains the allowed interval set and the symbol shape for a given
/// trading pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarketClass {
    Spot,
    FuturesLinear,
    FuturesInverse,
}

impl MarketClass {
    /// Path segment used in the cache layout and archive URL
    /// (`<cache_root>/<provider>/<market>/...`).
    #[must_use]
    pub fn canonical_path_segment(self) -> &'static str {
        match self {
            Self::Spot => "spot",
            Self::FuturesLinear => "futures-linear",
            Self::FuturesInverse => "futures-inverse",
        }
    }

    /// REST path segment (spec §6 `market-rest-segment`).
    #[must_use]
    pub fn rest_segment(self) -> &'static str {
        match self {
            Self::Spot => "api/v3",
            Self::FuturesLinear => "fapi/v1",
            Self::FuturesInverse => "dapi/v1",
        }
    }

    /// REST host (spec §6 "REST endpoint shape"); each market class is
    /// served from a distinct Binance subdomain.
    #[must_use]
    pub fn rest_root(self) -> &'static str {
        match self {
            Self::Spot => "https://api.binance.com",
            Self::FuturesLinear => "https://fapi.binance.com",
            Self::FuturesInverse => "https://dapi.binance.com",
        }
    }

    /// Archive URL `market-segment` mapping (spec §6).
    #[must_use]
    pub fn archive_segment(self) -> &'static str {
        match self {
            Self::Spot => "spot",
            Self::FuturesLinear => "futures/um",
            Self::FuturesInverse => "futures/cm",
        }
    }

    /// Default REST weight budget per minute (spec §6).
    #[must_use]
    pub fn default_rate_budget_per_minute(self) -> u32 {
        match self {
            Self::Spot => 6_000,
            Self::FuturesLinear | Self::FuturesInverse => 2_400,
        }
    }

    /// Per-call row cap for the klines endpoint (spec §4.6 "bounded by the
    /// endpoint's per-call maximum bar count").
    #[must_use]
    pub fn max_bars_per_request(self) -> u32 {
        match self {
            Self::Spot => 1_000,
            Self::FuturesLinear | Self::FuturesInverse => 1_500,
        }
    }

    /// REST request weight charged per call to the klines endpoint, used by
    /// the rolling per-minute budget (spec §4.6).
    #[must_use]
    pub fn klines_request_weight(self) -> u32 {
        match self {
            Self::Spot => 2,
            Self::FuturesLinear | Self::FuturesInverse => 5,
        }
    }
}

impl fmt::Display for MarketClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_path_segment())
    }
}

impl std::str::FromStr for MarketClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "spot" => Ok(Self::Spot),
            "futures-linear" | "linear" | "um" => Ok(Self::FuturesLinear),
            "futures-inverse" | "inverse" | "cm" => Ok(Self::FuturesInverse),
            other => Err(format!("unknown market class: {other}")),
        }
    }
}
