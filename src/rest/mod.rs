//! REST Client (C6): paginated windowed fetch against the online Binance
//! klines endpoint, with a rolling per-minute weight budget per market
//! class and retry on transient transport failures (spec §4.6).

mod limiter;
mod wire;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};
use url::Url;

use crate::catalog::{Interval, MarketClass};
use crate::core::Bar;
use crate::core::client::{HttpClient, RetryConfig};
use crate::core::config::RateLimitPolicy;
use crate::core::error::EngineError;
use crate::outcome::FetchOutcome;
use crate::time::Window;

pub use limiter::RateLimiter;

/// Online rate-limited REST endpoint (spec §4.6).
pub struct RestClient {
    http: Arc<HttpClient>,
    limiter: RateLimiter,
    retry: RetryConfig,
    policy: RateLimitPolicy,
    root_override: Option<HashMap<MarketClass, String>>,
}

impl RestClient {
    #[must_use]
    pub fn new(http: Arc<HttpClient>, rate_budget_per_market: &HashMap<MarketClass, u32>, retry: RetryConfig, policy: RateLimitPolicy) -> Self {
        Self {
            http,
            limiter: RateLimiter::new(rate_budget_per_market),
            retry,
            policy,
            root_override: None,
        }
    }

    /// Override the REST host for one market class, for pointing at a mock
    /// server in tests.
    #[must_use]
    pub fn with_rest_root_override(mut self, market: MarketClass, root: impl Into<String>) -> Self {
        self.root_override.get_or_insert_with(HashMap::new).insert(market, root.into());
        self
    }

    fn rest_root(&self, market: MarketClass) -> &str {
        self.root_override
            .as_ref()
            .and_then(|m| m.get(&market))
            .map(String::as_str)
            .unwrap_or_else(|| market.rest_root())
    }

    /// Fetch every bar in `window`, paginating forward until `window.end`
    /// is reached or a page returns fewer rows than requested (spec §4.6
    /// "paginates forward until `end` is reached or the server returns
    /// fewer than the requested count").
    ///
    /// A fatal status (418, ban) aborts immediately via `Err`; every other
    /// failure mode, including one that occurs mid-pagination, yields
    /// whatever bars were already collected as a `Served` (or the raw
    /// outcome if nothing was collected yet) so the caller can treat the
    /// remainder as still-open gap.
    pub async fn fetch_window(
        &self,
        market: MarketClass,
        symbol: &str,
        interval: Interval,
        window: Window,
    ) -> Result<FetchOutcome, EngineError> {
        let limit = market.max_bars_per_request();
        let mut collected: Vec<Bar> = Vec::new();
        let mut cursor = window.start_ms;
        let step = interval.millis();

        loop {
            if cursor >= window.end_ms {
                break;
            }
            let page_window = Window { start_ms: cursor, end_ms: window.end_ms };
            let key = format!("{market}/{symbol}/{interval}/{}..{}", page_window.start_ms, page_window.end_ms);

            let outcome = self.fetch_page(market, symbol, interval, page_window, limit, &key).await?;
            match outcome {
                FetchOutcome::Served { bars } => {
                    let returned = bars.len();
                    let last_open_time = bars.last().map(|b| b.open_time);
                    collected.extend(bars);
                    match last_open_time {
                        Some(t) if returned as u32 >= limit => cursor = t + step,
                        _ => break,
                    }
                }
                other => {
                    if collected.is_empty() {
                        return Ok(other);
                    }
                    warn!(key, "rest pagination stopped early, returning partial page");
                    break;
                }
            }
        }

        Ok(FetchOutcome::Served { bars: collected })
    }

    async fn fetch_page(
        &self,
        market: MarketClass,
        symbol: &str,
        interval: Interval,
        window: Window,
        limit: u32,
        key: &str,
    ) -> Result<FetchOutcome, EngineError> {
        let weight = market.klines_request_weight();
        if self.limiter.would_exceed(market, weight).await {
            match self.policy {
                RateLimitPolicy::FailFast => {
                    let hint = self.limiter.wait_hint(market, weight).await;
                    return Ok(FetchOutcome::RateLimited {
                        retry_after_ms: Some(hint.as_millis() as u64),
                    });
                }
                RateLimitPolicy::Wait => {
                    let hint = self.limiter.wait_hint(market, weight).await;
                    debug!(key, wait_ms = hint.as_millis() as u64, "rate budget exhausted, waiting");
                    tokio::time::sleep(hint).await;
                }
            }
        }

        self.limiter.charge(market, weight).await;

        let req = resp_builder(&self.http, self.rest_root(market), market, symbol, interval, window, limit)?;
        let resp = match self.http.send_with_retry(req, &self.retry, key).await {
            Ok(r) => r,
            Err(e) => {
                return Ok(FetchOutcome::TransportError { message: e.to_string() });
            }
        };

        let status = resp.status().as_u16();
        if status == 418 {
            let message = resp.text().await.unwrap_or_default();
            return Err(EngineError::FatalTransport { status, message });
        }
        if status == 429 {
            let retry_after_ms = resp
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(|secs| secs * 1000);
            return Ok(FetchOutcome::RateLimited { retry_after_ms });
        }
        if status >= 400 {
            let now_ms = Utc::now().timestamp_millis();
            if window.start_ms > now_ms {
                return Ok(FetchOutcome::RejectedFuture);
            }
            if status == 400 {
                return Ok(FetchOutcome::InvalidSymbol);
            }
            return Ok(FetchOutcome::TransportError {
                message: format!("rest endpoint returned HTTP {status}"),
            });
        }

        let body = resp.text().await.map_err(EngineError::Http)?;
        let bars = wire::parse_klines(&body, key)?;
        if bars.is_empty() {
            let now_ms = Utc::now().timestamp_millis();
            return Ok(if window.end_ms <= now_ms {
                FetchOutcome::EmptyClosed
            } else {
                FetchOutcome::EmptyPartialDay
            });
        }
        Ok(FetchOutcome::Served { bars })
    }

}

fn resp_builder(
    http: &HttpClient,
    root: &str,
    market: MarketClass,
    symbol: &str,
    interval: Interval,
    window: Window,
    limit: u32,
) -> Result<reqwest::RequestBuilder, EngineError> {
    let base = format!("{root}/{}/klines", market.rest_segment());
    let mut url = Url::parse(&base)?;
    url.query_pairs_mut()
        .append_pair("symbol", symbol)
        .append_pair("interval", interval.canonical_name())
        .append_pair("startTime", &window.start_ms.to_string())
        .append_pair("endTime", &window.end_ms.to_string())
        .append_pair("limit", &limit.to_string());
    Ok(http.get(url))
}
