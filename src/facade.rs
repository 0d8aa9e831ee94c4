//! Public Query Façade (C9): validates a caller's query, aligns it, drives
//! the orchestrator, and applies the dense-vs-available-only output policy
//! (spec §4.9).

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::catalog::{self, Interval, MarketClass, Provider};
use crate::core::config::EngineConfig;
use crate::core::error::EngineError;
use crate::core::models::BarSeries;
use crate::orchestrator::Orchestrator;
use crate::time::{Window, align};

/// Run one complete query: validate, align, orchestrate, and shape the
/// output per `config.auto_reindex` (spec §4.9).
///
/// `start`/`end` are `DateTime<Utc>`, so "naive local time" is rejected at
/// the type level rather than by a runtime check (spec §4.9 "times are UTC
/// and not naive").
///
/// A symbol/market shape mismatch logs the repair suggestion (if any) and
/// returns an empty `BarSeries`, not an error, unless
/// `config.strict_symbol_validation` is set (spec §3, §8 property 14).
pub async fn query(
    orchestrator: &Orchestrator,
    config: &EngineConfig,
    market: MarketClass,
    symbol: &str,
    interval: Interval,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<BarSeries, EngineError> {
    if let catalog::ValidationOutcome::Rejected { suggestion } = catalog::validate(symbol, market) {
        if let Some(s) = &suggestion {
            warn!(symbol, suggestion = s, "symbol rejected, did you mean this?");
        } else {
            warn!(symbol, "symbol rejected, no suggestion available");
        }
        if config.strict_symbol_validation {
            return Err(EngineError::InvalidSymbol {
                symbol: symbol.to_string(),
                market,
            });
        }
        return Ok(BarSeries::default());
    }
    if !interval.allowed_for(market) {
        return Err(EngineError::InvalidInput(format!(
            "interval {interval} is not permitted for market {market}"
        )));
    }

    let requested = Window::new(start, end)
        .ok_or_else(|| EngineError::InvalidInput(format!("start {start} must be before end {end}")))?;

    let aligned = align(requested, interval);

    let result = orchestrator
        .execute(Provider::Binance, market, symbol, interval, aligned, config.source_override)
        .await?;

    if config.auto_reindex {
        let series = BarSeries::dense_reindex(&result.bars, aligned, interval);
        let missing = series.missing_fraction();
        if missing > config.reindex_warn_fraction {
            warn!(
                symbol,
                %interval,
                missing_fraction = missing,
                threshold = config.reindex_warn_fraction,
                "dense-reindexed series has a high fraction of missing rows"
            );
        }
        Ok(series)
    } else {
        let clipped: Vec<_> = result
            .bars
            .into_iter()
            .filter(|b| b.open_time >= requested.start_ms && b.open_time < requested.end_ms)
            .collect();
        Ok(BarSeries::available_only(&clipped))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_interval_not_allowed_for_market() {
        assert!(!Interval::Sec1.allowed_for(MarketClass::FuturesLinear));
    }
}
