use thiserror::Error;

use crate::catalog::MarketClass;

/// Errors surfaced to callers of the public façade.
///
/// Per-day / per-gap failures inside the orchestrator are represented as
/// [`crate::outcome::FetchOutcome`] values, not as this type; `EngineError`
/// is reserved for `invalid-input` and `fatal-transport` (see spec §7) and for
/// the point where the orchestrator gives up on a gap no tier could fill.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV decode error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("symbol {symbol:?} does not match market {market:?}")]
    InvalidSymbol {
        symbol: String,
        market: MarketClass,
    },

    #[error("rate limited for market {market:?}, retry after {retry_after_ms:?}ms")]
    RateLimited {
        market: MarketClass,
        retry_after_ms: Option<u64>,
    },

    #[error("integrity check failed for {key}: {reason}")]
    Integrity { key: String, reason: String },

    #[error("transport error for {key} after {attempts} attempts: {source}")]
    Transport {
        key: String,
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("corrupt cache file at {path}: {reason}")]
    CorruptCacheFile { path: String, reason: String },

    #[error("fatal transport error (status {status}): {message}")]
    FatalTransport { status: u16, message: String },

    #[error("query could not be completed: gap {gap_start}..{gap_end} for {key} unservable ({reason})")]
    PartialCoverage {
        key: String,
        gap_start: i64,
        gap_end: i64,
        reason: String,
    },
}
