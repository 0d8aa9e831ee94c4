//! FCP-PM Orchestrator (C8): drives the tier sequence Cache -> Archive ->
//! REST, merges partial results with CACHE < ARCHIVE < REST precedence, and
//! decides what gets written back to cache (spec §4.8).

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};

use crate::archive::{ArchiveClient, ArchiveRequest};
use crate::cache::{CacheHit, CacheKey, CacheStore};
use crate::catalog::{Interval, MarketClass, Provider};
use crate::core::Bar;
use crate::core::config::SourceOverride;
use crate::core::error::EngineError;
use crate::core::models::sort_dedup_keep_last;
use crate::gap::{self, Gap};
use crate::outcome::FetchOutcome;
use crate::rest::RestClient;
use crate::time::{Day, Window, days_covering, expected_count};

/// Raw result of one orchestrated query: merged bars plus coverage metadata
/// (spec §7 `partial-coverage`: "non-fatal signal; delivered via log +
/// return-value coverage metadata").
#[derive(Debug, Clone)]
pub struct OrchestratorResult {
    pub bars: Vec<Bar>,
    pub unresolved_gaps: Vec<Gap>,
}

pub struct Orchestrator {
    cache: CacheStore,
    archive: ArchiveClient,
    rest: RestClient,
}

impl Orchestrator {
    #[must_use]
    pub fn new(cache: CacheStore, archive: ArchiveClient, rest: RestClient) -> Self {
        Self { cache, archive, rest }
    }

    pub async fn execute(
        &self,
        provider: Provider,
        market: MarketClass,
        symbol: &str,
        interval: Interval,
        window: Window,
        source_override: SourceOverride,
    ) -> Result<OrchestratorResult, EngineError> {
        match source_override {
            SourceOverride::Auto => self.execute_auto(provider, market, symbol, interval, window).await,
            SourceOverride::CacheOnly => {
                let owned = self.cache_sweep(provider, market, symbol, interval, window);
                Ok(self.finalize(owned, window, interval))
            }
            SourceOverride::ArchiveOnly => {
                let mut owned = Vec::new();
                let requests = day_requests(market, symbol, interval, days_covering(window));
                for (req, outcome) in self.archive.fetch_days(&requests).await {
                    if let FetchOutcome::Served { bars } = outcome {
                        owned.extend(bars);
                    } else if matches!(outcome, FetchOutcome::IntegrityError { .. }) {
                        warn!(day = req.day.format_ymd(), "archive integrity error under archive-only override");
                    }
                }
                Ok(self.finalize(owned, window, interval))
            }
            SourceOverride::RestOnly => {
                let outcome = self.rest.fetch_window(market, symbol, interval, window).await?;
                let owned = outcome.bars().to_vec();
                Ok(self.finalize(owned, window, interval))
            }
        }
    }

    async fn execute_auto(
        &self,
        provider: Provider,
        market: MarketClass,
        symbol: &str,
        interval: Interval,
        window: Window,
    ) -> Result<OrchestratorResult, EngineError> {
        // 1. Cache sweep.
        let mut owned = self.cache_sweep(provider, market, symbol, interval, window);

        // 2. Gap analysis.
        let mut gaps = gap::analyze(window, interval, &owned);
        let mut integrity_days: HashSet<Day> = HashSet::new();

        // 3. Archive pass: only over closed days that still have a gap.
        let now = chrono::Utc::now();
        let archive_days: Vec<Day> = gaps
            .iter()
            .map(|g| crate::time::day_of(g.start_ms))
            .collect::<HashSet<_>>()
            .into_iter()
            .filter(|d| d.is_closed(now))
            .collect();

        if !archive_days.is_empty() {
            let requests = day_requests(market, symbol, interval, archive_days);
            for (req, outcome) in self.archive.fetch_days(&requests).await {
                match outcome {
                    FetchOutcome::Served { bars } => {
                        let complete = bars.len() as i64 == expected_count(interval);
                        owned.extend(bars.clone());
                        if complete {
                            let key = CacheKey {
                                provider,
                                market,
                                symbol: symbol.to_string(),
                                interval,
                                day: req.day,
                            };
                            if let Err(e) = self.cache.put(&key, &bars, false) {
                                warn!(key = %key.display(), error = %e, "failed to write archive pack to cache");
                            }
                        }
                    }
                    FetchOutcome::NotYetPublished | FetchOutcome::EmptyClosed => {
                        info!(day = req.day.format_ymd(), "archive day unavailable, falling through");
                    }
                    FetchOutcome::IntegrityError { reason } => {
                        warn!(day = req.day.format_ymd(), reason, "archive integrity error, deferring to rest");
                        integrity_days.insert(req.day);
                    }
                    other => {
                        warn!(day = req.day.format_ymd(), outcome = ?other, "unexpected archive outcome");
                    }
                }
            }
        }

        // 4. Re-analyze gaps.
        owned = sort_dedup_keep_last(owned);
        gaps = gap::analyze(window, interval, &owned);

        // 5. REST pass.
        for g in &gaps {
            match self.rest.fetch_window(market, symbol, interval, g.window()).await? {
                FetchOutcome::Served { bars } => {
                    let day = crate::time::day_of(g.start_ms);
                    if day.is_closed(now) && bars.len() as i64 == expected_count(interval) {
                        let key = CacheKey {
                            provider,
                            market,
                            symbol: symbol.to_string(),
                            interval,
                            day,
                        };
                        if let Err(e) = self.cache.put(&key, &bars, false) {
                            warn!(key = %key.display(), error = %e, "failed to write rest-sourced pack to cache");
                        }
                    }
                    owned.extend(bars);
                }
                FetchOutcome::NotYetPublished | FetchOutcome::EmptyClosed | FetchOutcome::EmptyPartialDay => {}
                FetchOutcome::RateLimited { .. } | FetchOutcome::TransportError { .. } => {
                    warn!(gap = ?g, "rest could not fill gap");
                }
                other => {
                    warn!(gap = ?g, outcome = ?other, "unexpected rest outcome");
                }
            }
        }

        // 6. Finalize.
        owned = sort_dedup_keep_last(owned);
        let result = self.finalize(owned, window, interval);

        let unresolved_day_gap = result
            .unresolved_gaps
            .iter()
            .find(|g| integrity_days.contains(&crate::time::day_of(g.start_ms)));
        if let Some(g) = unresolved_day_gap {
            return Err(EngineError::PartialCoverage {
                key: format!("{market}/{symbol}/{interval}"),
                gap_start: g.start_ms,
                gap_end: g.end_ms,
                reason: "archive integrity-error and rest could not cover the day".to_string(),
            });
        }

        Ok(result)
    }

    fn cache_sweep(&self, provider: Provider, market: MarketClass, symbol: &str, interval: Interval, window: Window) -> Vec<Bar> {
        let mut owned = Vec::new();
        for day in days_covering(window) {
            let key = CacheKey { provider, market, symbol: symbol.to_string(), interval, day };
            match self.cache.get(&key) {
                Ok(CacheHit::Hit(view)) => owned.extend(view.bars()),
                Ok(CacheHit::Miss) => {}
                Err(e) => {
                    warn!(key = %key.display(), error = %e, "cache read failed, quarantining");
                    let _ = self.cache.quarantine(&key);
                }
            }
        }
        sort_dedup_keep_last(owned)
    }

    fn finalize(&self, owned: Vec<Bar>, window: Window, interval: Interval) -> OrchestratorResult {
        let mut bars = sort_dedup_keep_last(owned);
        bars.retain(|b| b.open_time >= window.start_ms && b.open_time < window.end_ms);
        let unresolved_gaps = gap::analyze(window, interval, &bars);
        OrchestratorResult { bars, unresolved_gaps }
    }
}

fn day_requests(market: MarketClass, symbol: &str, interval: Interval, days: Vec<Day>) -> Vec<ArchiveRequest> {
    days.into_iter()
        .map(|day| ArchiveRequest { market, symbol: symbol.to_string(), interval, day })
        .collect()
}

/// Construct the default set of engine collaborators behind an `Arc`'d HTTP
/// client, the shape the façade (C9) wires together (spec §9 "Ambient/global
/// state" design note: explicit construction, not a hidden singleton).
#[must_use]
pub fn build(config: &crate::core::config::EngineConfig, http: Arc<crate::core::client::HttpClient>) -> Orchestrator {
    let cache = CacheStore::new(config.cache_root.clone());
    let archive = ArchiveClient::new(http.clone(), config);
    let rest = RestClient::new(http, &config.rate_budget_per_market, config.retry.clone(), config.rate_limit_policy);
    Orchestrator::new(cache, archive, rest)
}
