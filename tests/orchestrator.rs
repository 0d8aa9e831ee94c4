//! Integration tests for the FCP-PM Orchestrator (C8): tier sequencing,
//! cross-tier merge precedence, and cache write-back.

mod common;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use binance_klines_rs::archive::ArchiveClient;
use binance_klines_rs::cache::{CacheHit, CacheKey, CacheStore};
use binance_klines_rs::catalog::Provider;
use binance_klines_rs::core::client::{HttpClient, RetryConfig};
use binance_klines_rs::core::config::{EngineConfig, RateLimitPolicy};
use binance_klines_rs::core::models::Bar;
use binance_klines_rs::orchestrator::Orchestrator;
use binance_klines_rs::rest::RestClient;
use binance_klines_rs::time::{Day, Window};
use binance_klines_rs::{Interval, MarketClass};
use httpmock::MockServer;

fn bar(open_time: i64, close: f64) -> Bar {
    Bar { open_time, open: close, high: close, low: close, close, volume: 1.0 }
}

fn day_window(day: Day) -> Window {
    Window { start_ms: day.start_ms(), end_ms: day.end_ms() }
}

#[tokio::test]
async fn archive_bars_win_over_cache_on_duplicate_open_time() {
    let archive_server = MockServer::start();
    let rest_server = MockServer::start();
    let tmp = tempfile::tempdir().unwrap();
    let config = EngineConfig::default();

    let day = Day(1_700_000_000_000i64 / 86_400_000 * 86_400_000);
    let step = Interval::Hour1.millis();
    let symbol = "BTCUSDT";
    let market = MarketClass::Spot;

    // Cache already holds the first hour, with a stale close price.
    let cache = CacheStore::new(tmp.path().to_path_buf());
    let stale_key = CacheKey { provider: Provider::Binance, market, symbol: symbol.to_string(), interval: Interval::Hour1, day };
    cache.put(&stale_key, &[bar(day.start_ms(), 1.0)], true).expect("seed cache");

    // Archive serves the full day, with a fresh close price for hour 0.
    let full_day: Vec<Bar> = (0..24).map(|i| bar(day.start_ms() + i * step, 2.0)).collect();
    let csv = full_day
        .iter()
        .map(|b| format!("{},{:.1},{:.1},{:.1},{:.1},1.0,{},0,0,0,0,0\n", b.open_time, b.open, b.high, b.low, b.close, b.open_time + step - 1))
        .collect::<String>();
    let zip_bytes = common::make_zip(&format!("{symbol}-1h-{}.csv", day.format_ymd()), &csv);
    let digest = common::sha256_hex(&zip_bytes);
    let zip_path = format!("/data/spot/daily/klines/{symbol}/1h/{symbol}-1h-{}.zip", day.format_ymd());
    archive_server.mock(|when, then| {
        when.method(httpmock::Method::GET).path(zip_path.clone());
        then.status(200).body(zip_bytes.clone());
    });
    archive_server.mock(|when, then| {
        when.method(httpmock::Method::GET).path(format!("{zip_path}.CHECKSUM"));
        then.status(200).body(format!("{digest}  x\n"));
    });

    let http = Arc::new(HttpClient::new(Duration::from_secs(5)));
    let archive = ArchiveClient::new(http.clone(), &config).with_archive_root(format!("{}/data", archive_server.base_url()));
    let mut budgets = HashMap::new();
    budgets.insert(market, market.default_rate_budget_per_minute());
    let rest = RestClient::new(http, &budgets, RetryConfig::default(), RateLimitPolicy::FailFast)
        .with_rest_root_override(market, rest_server.base_url());

    let orchestrator = Orchestrator::new(cache.clone(), archive, rest);
    let result = orchestrator
        .execute(Provider::Binance, market, symbol, Interval::Hour1, day_window(day), Default::default())
        .await
        .expect("execute ok");

    assert_eq!(result.bars.len(), 24);
    let first = result.bars.iter().find(|b| b.open_time == day.start_ms()).unwrap();
    assert_eq!(first.close, 2.0, "archive-sourced bar must win over the stale cached one");
    assert!(result.unresolved_gaps.is_empty());
}

#[tokio::test]
async fn complete_closed_day_served_by_rest_is_written_back_to_cache() {
    let archive_server = MockServer::start();
    let rest_server = MockServer::start();
    let tmp = tempfile::tempdir().unwrap();
    let config = EngineConfig::default();

    let day = Day(1_650_000_000_000i64 / 86_400_000 * 86_400_000);
    let step = Interval::Hour1.millis();
    let symbol = "ETHUSDT";
    let market = MarketClass::Spot;

    // Archive has nothing for this day yet.
    let zip_path = format!("/data/spot/daily/klines/{symbol}/1h/{symbol}-1h-{}.zip", day.format_ymd());
    archive_server.mock(|when, then| {
        when.method(httpmock::Method::GET).path(zip_path.clone());
        then.status(404);
    });

    let rows: Vec<_> = (0..24)
        .map(|i| {
            let t = day.start_ms() + i * step;
            serde_json::json!([t, "10.0", "11.0", "9.0", "10.5", "1.0", t + step - 1, "10.0", 1, "0.5", "5.0", "0"])
        })
        .collect();
    rest_server.mock(|when, then| {
        when.method(httpmock::Method::GET).path("/api/v3/klines").query_param("symbol", symbol);
        then.status(200).json_body(serde_json::Value::Array(rows));
    });

    let cache = CacheStore::new(tmp.path().to_path_buf());
    let http = Arc::new(HttpClient::new(Duration::from_secs(5)));
    let archive = ArchiveClient::new(http.clone(), &config).with_archive_root(format!("{}/data", archive_server.base_url()));
    let mut budgets = HashMap::new();
    budgets.insert(market, market.default_rate_budget_per_minute());
    let rest = RestClient::new(http, &budgets, RetryConfig::default(), RateLimitPolicy::FailFast)
        .with_rest_root_override(market, rest_server.base_url());

    let orchestrator = Orchestrator::new(cache.clone(), archive, rest);
    let result = orchestrator
        .execute(Provider::Binance, market, symbol, Interval::Hour1, day_window(day), Default::default())
        .await
        .expect("execute ok");

    assert_eq!(result.bars.len(), 24);

    let key = CacheKey { provider: Provider::Binance, market, symbol: symbol.to_string(), interval: Interval::Hour1, day };
    match cache.get(&key).expect("cache get ok") {
        CacheHit::Hit(view) => assert_eq!(view.bars().len(), 24),
        CacheHit::Miss => panic!("expected rest-sourced complete day to be written back to cache"),
    }
}
