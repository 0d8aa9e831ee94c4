use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::catalog::MarketClass;

const WINDOW: Duration = Duration::from_secs(60);

struct Bucket {
    budget: u32,
    /// (timestamp, weight) entries within the rolling window, oldest first.
    entries: Vec<(Instant, u32)>,
}

impl Bucket {
    fn new(budget: u32) -> Self {
        Self { budget, entries: Vec::new() }
    }

    fn evict_stale(&mut self, now: Instant) {
        self.entries.retain(|(t, _)| now.duration_since(*t) < WINDOW);
    }

    fn used(&self) -> u32 {
        self.entries.iter().map(|(_, w)| *w).sum()
    }
}

/// Rolling per-minute weight limiter, one bucket per market class (spec
/// §4.6: "the client maintains a rolling per-minute weight counter per
/// (market)").
pub struct RateLimiter {
    buckets: Mutex<HashMap<MarketClass, Bucket>>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(budgets: &HashMap<MarketClass, u32>) -> Self {
        let mut buckets = HashMap::new();
        for (market, budget) in budgets {
            buckets.insert(*market, Bucket::new(*budget));
        }
        Self { buckets: Mutex::new(buckets) }
    }

    /// Would charging `weight` against `market`'s bucket exceed its budget
    /// right now? Does not mutate state.
    pub async fn would_exceed(&self, market: MarketClass, weight: u32) -> bool {
        let now = Instant::now();
        let mut buckets = self.buckets.lock().await;
        let bucket = buckets.entry(market).or_insert_with(|| Bucket::new(market.default_rate_budget_per_minute()));
        bucket.evict_stale(now);
        bucket.used() + weight > bucket.budget
    }

    /// Charge `weight` against `market`'s bucket unconditionally. Callers
    /// check [`Self::would_exceed`] first under the same policy branch.
    pub async fn charge(&self, market: MarketClass, weight: u32) {
        let now = Instant::now();
        let mut buckets = self.buckets.lock().await;
        let bucket = buckets.entry(market).or_insert_with(|| Bucket::new(market.default_rate_budget_per_minute()));
        bucket.evict_stale(now);
        bucket.entries.push((now, weight));
    }

    /// How long until enough of the current window's charges expire for
    /// `weight` to fit, used by the `Wait` policy.
    pub async fn wait_hint(&self, market: MarketClass, weight: u32) -> Duration {
        let now = Instant::now();
        let mut buckets = self.buckets.lock().await;
        let bucket = buckets.entry(market).or_insert_with(|| Bucket::new(market.default_rate_budget_per_minute()));
        bucket.evict_stale(now);
        if bucket.used() + weight <= bucket.budget {
            return Duration::ZERO;
        }
        let mut freed = 0u32;
        for (t, w) in &bucket.entries {
            freed += w;
            if bucket.used() - freed + weight <= bucket.budget {
                return WINDOW.saturating_sub(now.duration_since(*t));
            }
        }
        WINDOW
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn allows_charges_within_budget() {
        let mut budgets = HashMap::new();
        budgets.insert(MarketClass::Spot, 10);
        let limiter = RateLimiter::new(&budgets);
        assert!(!limiter.would_exceed(MarketClass::Spot, 5).await);
        limiter.charge(MarketClass::Spot, 5).await;
        assert!(!limiter.would_exceed(MarketClass::Spot, 5).await);
        limiter.charge(MarketClass::Spot, 5).await;
        assert!(limiter.would_exceed(MarketClass::Spot, 1).await);
    }
}
