//! Archive Client (C5): fetches Binance's daily kline zip archives from the
//! public object store, verifies their SHA256 checksum, and decodes the
//! contained CSV into bars (spec §4.5).
//!
//! Mirrors the zip-download-then-verify-then-parse pipeline in
//! `other_examples/.../rangebar_export.rs`, adapted to the engine's
//! `FetchOutcome` result type instead of bailing out with `?` on a boxed
//! error.

mod checksum;
mod wire;

use std::io::{Cursor, Read};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, warn};
use zip::ZipArchive;

use crate::catalog::{Interval, MarketClass};
use crate::core::client::{HttpClient, RetryConfig};
use crate::core::config::EngineConfig;
use crate::core::error::EngineError;
use crate::outcome::FetchOutcome;
use crate::time::Day;

const ARCHIVE_ROOT: &str = "https://data.binance.vision/data";

/// One day's request to the archive.
#[derive(Debug, Clone)]
pub struct ArchiveRequest {
    pub market: MarketClass,
    pub symbol: String,
    pub interval: Interval,
    pub day: Day,
}

impl ArchiveRequest {
    fn zip_url(&self, root: &str) -> String {
        format!(
            "{}/{}/daily/klines/{}/{}/{}-{}-{}.zip",
            root,
            self.market.archive_segment(),
            self.symbol,
            self.interval.canonical_name(),
            self.symbol,
            self.interval.canonical_name(),
            self.day.format_ymd(),
        )
    }

    fn checksum_url(&self, root: &str) -> String {
        format!("{}.CHECKSUM", self.zip_url(root))
    }

    fn csv_entry_name(&self) -> String {
        format!(
            "{}-{}-{}.csv",
            self.symbol,
            self.interval.canonical_name(),
            self.day.format_ymd(),
        )
    }

    fn key(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.market,
            self.symbol,
            self.interval,
            self.day.format_ymd()
        )
    }
}

/// Binance's public archive object store (spec §4.5).
#[derive(Debug, Clone)]
pub struct ArchiveClient {
    http: Arc<HttpClient>,
    concurrency: usize,
    root: String,
    retry: RetryConfig,
}

impl ArchiveClient {
    #[must_use]
    pub fn new(http: Arc<HttpClient>, config: &EngineConfig) -> Self {
        Self {
            http,
            concurrency: config.archive_concurrency.max(1),
            root: ARCHIVE_ROOT.to_string(),
            retry: config.retry.clone(),
        }
    }

    /// Override the archive root URL, for pointing at a mock server in
    /// tests.
    #[must_use]
    pub fn with_archive_root(mut self, root: impl Into<String>) -> Self {
        self.root = root.into();
        self
    }

    /// Fetch a single day. Never returns `Err`: every failure mode is
    /// carried as a [`FetchOutcome`] variant so the orchestrator can isolate
    /// it to this one day (spec §5 "Failure isolation", §4.5).
    pub async fn fetch_day(&self, req: &ArchiveRequest) -> FetchOutcome {
        let key = req.key();
        let url = req.zip_url(&self.root);

        let resp = match self.http.send_with_retry(self.http.get(parse_url(&url)), &self.retry, &key).await {
            Ok(r) => r,
            Err(e) => {
                return FetchOutcome::TransportError { message: e.to_string() };
            }
        };

        let status = resp.status().as_u16();
        if status == 404 || status == 403 {
            debug!(key, status, "archive day not yet published");
            return FetchOutcome::NotYetPublished;
        }
        if !resp.status().is_success() {
            return FetchOutcome::TransportError {
                message: format!("archive returned HTTP {status}"),
            };
        }

        let zip_bytes = match resp.bytes().await {
            Ok(b) => b,
            Err(e) => return FetchOutcome::TransportError { message: e.to_string() },
        };

        if let Err(outcome) = self.verify_checksum(req, &zip_bytes).await {
            if !matches!(outcome, FetchOutcome::NotYetPublished) {
                warn!(key, ?outcome, "archive checksum verification failed");
            }
            return outcome;
        }

        match self.extract_and_parse(req, &zip_bytes) {
            Ok(bars) if bars.is_empty() => FetchOutcome::EmptyClosed,
            Ok(bars) => FetchOutcome::Served { bars },
            Err(e) => FetchOutcome::IntegrityError { reason: e.to_string() },
        }
    }

    /// Fetch many days with a bounded concurrency ceiling (spec §4.5
    /// "archive_concurrency"), preserving no particular output order —
    /// callers key results by the request they correspond to.
    pub async fn fetch_days(&self, requests: &[ArchiveRequest]) -> Vec<(ArchiveRequest, FetchOutcome)> {
        stream::iter(requests.iter().cloned())
            .map(|req| async move {
                let outcome = self.fetch_day(&req).await;
                (req, outcome)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await
    }

    /// Fetch and verify the `.CHECKSUM` companion file. Returns `Err` with
    /// `FetchOutcome::NotYetPublished` (rather than `IntegrityError`) when
    /// the checksum file itself 403s/404s, since that means the day hasn't
    /// been published yet, not that the zip is corrupt (spec §4.5).
    async fn verify_checksum(&self, req: &ArchiveRequest, zip_bytes: &[u8]) -> Result<(), FetchOutcome> {
        let key = req.key();
        let checksum_url = req.checksum_url(&self.root);
        let resp = self
            .http
            .send_with_retry(self.http.get(parse_url(&checksum_url)), &self.retry, &key)
            .await
            .map_err(|e| FetchOutcome::TransportError { message: e.to_string() })?;

        let status = resp.status().as_u16();
        if status == 404 || status == 403 {
            return Err(FetchOutcome::NotYetPublished);
        }
        if !resp.status().is_success() {
            return Err(FetchOutcome::TransportError {
                message: format!("checksum fetch returned HTTP {status}"),
            });
        }
        let text = resp.text().await.map_err(|e| FetchOutcome::TransportError { message: e.to_string() })?;
        let expected = checksum::parse_expected_digest(&text, &key)
            .map_err(|e| FetchOutcome::IntegrityError { reason: e.to_string() })?;
        checksum::verify(zip_bytes, &expected, &key).map_err(|e| FetchOutcome::IntegrityError { reason: e.to_string() })
    }

    fn extract_and_parse(&self, req: &ArchiveRequest, zip_bytes: &[u8]) -> Result<Vec<crate::core::Bar>, EngineError> {
        let key = req.key();
        let cursor = Cursor::new(zip_bytes);
        let mut archive = ZipArchive::new(cursor).map_err(|e| EngineError::Integrity {
            key: key.clone(),
            reason: format!("not a valid zip: {e}"),
        })?;

        let entry_name = req.csv_entry_name();
        let mut entry = archive.by_name(&entry_name).or_else(|_| {
            // Some historical archives nest the CSV under a different case
            // or omit the interval segment; fall back to the sole entry if
            // there is exactly one.
            if archive.len() == 1 {
                archive.by_index(0)
            } else {
                Err(zip::result::ZipError::FileNotFound)
            }
        }).map_err(|e| EngineError::Integrity {
            key: key.clone(),
            reason: format!("csv entry not found in archive: {e}"),
        })?;

        let mut body = String::with_capacity(entry.size() as usize);
        entry.read_to_string(&mut body).map_err(EngineError::Io)?;
        drop(entry);

        wire::parse_csv(&body, &key)
    }
}

fn parse_url(s: &str) -> url::Url {
    url::Url::parse(s).expect("archive URLs are built from a fixed, well-formed template")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zip_url_matches_binance_archive_layout() {
        let req = ArchiveRequest {
            market: MarketClass::Spot,
            symbol: "BTCUSDT".to_string(),
            interval: Interval::Min1,
            day: Day(1_700_000_000_000 / 86_400_000 * 86_400_000),
        };
        let url = req.zip_url(ARCHIVE_ROOT);
        assert!(url.starts_with("https://data.binance.vision/data/spot/daily/klines/BTCUSDT/1m/BTCUSDT-1m-"));
        assert!(url.ends_with(".zip"));
    }

    #[test]
    fn checksum_url_appends_suffix() {
        let req = ArchiveRequest {
            market: MarketClass::FuturesLinear,
            symbol: "BTCUSDT".to_string(),
            interval: Interval::Hour1,
            day: Day(0),
        };
        assert!(req.checksum_url(ARCHIVE_ROOT).ends_with(".zip.CHECKSUM"));
        assert!(req.zip_url(ARCHIVE_ROOT).contains("futures/um"));
    }
}
