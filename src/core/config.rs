use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::catalog::MarketClass;
use crate::core::client::RetryConfig;

/// Log verbosity (spec §6 `log_level`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Critical,
    Error,
    Warning,
    Info,
    Debug,
}

impl LogLevel {
    #[must_use]
    pub fn as_tracing_level(self) -> tracing::Level {
        match self {
            Self::Critical | Self::Error => tracing::Level::ERROR,
            Self::Warning => tracing::Level::WARN,
            Self::Info => tracing::Level::INFO,
            Self::Debug => tracing::Level::DEBUG,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "critical" => Ok(Self::Critical),
            "error" => Ok(Self::Error),
            "warning" | "warn" => Ok(Self::Warning),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}

/// Orchestrator tier override (spec §4.8 `source_override`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceOverride {
    #[default]
    Auto,
    CacheOnly,
    ArchiveOnly,
    RestOnly,
}

/// REST rate-limit policy when the projected request weight would exceed
/// the rolling per-minute budget (spec §4.6, §9 Open Question 4: "this spec
/// exposes it as configuration and refuses to guess a default beyond
/// 'never silently swallow 429'"). See `DESIGN.md` for the chosen default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitPolicy {
    /// Sleep until the rolling window has room, then send.
    Wait,
    /// Return `FetchOutcome::RateLimited` immediately instead of sending.
    FailFast,
}

/// Engine-wide configuration (spec §6 "Configuration (recognized options)").
///
/// Modeled as a plain, explicitly-constructed value threaded through the
/// façade and components (spec §9 "Ambient/global state" design note),
/// never a hidden singleton.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub cache_root: PathBuf,
    pub http_timeout: Duration,
    pub rate_budget_per_market: HashMap<MarketClass, u32>,
    pub archive_concurrency: usize,
    pub log_level: LogLevel,
    pub suppress_http_debug: bool,
    pub quiet_mode: bool,
    pub source_override: SourceOverride,
    pub auto_reindex: bool,
    pub return_columnar_native: bool,
    /// Fraction of missing rows (0.0-1.0) above which a dense-reindex
    /// warning is emitted. Spec §9 Open Question 1: the source's threshold
    /// is inconsistently documented as 50%; exposed here as configuration,
    /// defaulted conservatively (see `DESIGN.md`).
    pub reindex_warn_fraction: f64,
    /// Retry policy, including the `max_retries` cap named in spec §6's
    /// "recognized options" table — `RetryConfig` is the single source of
    /// truth for it, rather than a second, independently-defaulted field
    /// here that nothing reads.
    pub retry: RetryConfig,
    pub rate_limit_policy: RateLimitPolicy,
    /// Escalate a symbol/market shape mismatch to `EngineError::InvalidSymbol`
    /// instead of the default empty result (spec §3 "mismatch yields an
    /// empty result, not an error", §8 property 14 "unless the façade's
    /// strict validation mode is enabled").
    pub strict_symbol_validation: bool,
}

impl EngineConfig {
    #[must_use]
    pub fn default_cache_root() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("binance-klines-rs")
    }

    /// Read environment-variable overrides once, at construction (spec §6
    /// "Environment variables"): log level, log file path, color-disable
    /// flag. The log file path and color flag are consumed by the logging
    /// setup in `EngineContext::init_tracing`, not stored here, since they
    /// configure the sink rather than the engine's own behavior.
    #[must_use]
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(level) = std::env::var("BINKLINE_LOG_LEVEL") {
            if let Ok(parsed) = level.parse() {
                cfg.log_level = parsed;
            }
        }
        cfg
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        let mut rate_budget = HashMap::new();
        rate_budget.insert(MarketClass::Spot, MarketClass::Spot.default_rate_budget_per_minute());
        rate_budget.insert(
            MarketClass::FuturesLinear,
            MarketClass::FuturesLinear.default_rate_budget_per_minute(),
        );
        rate_budget.insert(
            MarketClass::FuturesInverse,
            MarketClass::FuturesInverse.default_rate_budget_per_minute(),
        );

        Self {
            cache_root: Self::default_cache_root(),
            http_timeout: Duration::from_secs(30),
            rate_budget_per_market: rate_budget,
            archive_concurrency: 4,
            log_level: LogLevel::Error,
            suppress_http_debug: true,
            quiet_mode: false,
            source_override: SourceOverride::Auto,
            auto_reindex: false,
            return_columnar_native: false,
            reindex_warn_fraction: 0.5,
            retry: RetryConfig::default(),
            rate_limit_policy: RateLimitPolicy::FailFast,
            strict_symbol_validation: false,
        }
    }
}
