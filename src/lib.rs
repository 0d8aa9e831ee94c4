//! # binance-klines-rs
//!
//! A failover engine for historical Binance kline (candlestick) data: a
//! local memory-mapped columnar cache, Binance's bulk archive object store,
//! and the rate-limited REST API, combined behind one query.
//!
//! The engine decides per day which tier owns the authoritative copy,
//! merges partial results from multiple tiers into one contiguous,
//! deduplicated, time-sorted series, and never fabricates data for
//! timestamps no source actually returned.
//!
//! ## Quick start
//!
//! ```no_run
//! use binance_klines_rs::{EngineConfig, MarketClass, Interval, facade};
//! use binance_klines_rs::orchestrator;
//! use chrono::{Duration, Utc};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::default();
//!     let http = Arc::new(binance_klines_rs::core::client::HttpClient::new(config.http_timeout));
//!     let engine = orchestrator::build(&config, http);
//!
//!     let end = Utc::now();
//!     let start = end - Duration::days(1);
//!     let series = facade::query(&engine, &config, MarketClass::Spot, "BTCUSDT", Interval::Hour1, start, end).await?;
//!     println!("{} bars", series.len());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![allow(clippy::too_many_arguments)]

/// Ambient stack: HTTP client + retry, error type, configuration, engine
/// context, and the concrete `Bar`/`BarSeries` data model.
pub mod core;

/// Market Catalog (C1): providers, market classes, intervals, symbol shape.
pub mod catalog;
/// Time Arithmetic (C2): boundary alignment, day windowing, gap arithmetic.
pub mod time;

/// Columnar Day-Pack Codec (C3): mmap-backed per-day binary format.
pub mod daypack;
/// Cache Store (C4): content-addressed on-disk directory of day-packs.
pub mod cache;

/// Archive Client (C5): checksum-verified bulk historical object store.
pub mod archive;
/// REST Client (C6): paginated, rate-limited online endpoint.
pub mod rest;

/// Gap Analyzer (C7): missing half-open sub-ranges, day-decomposed.
pub mod gap;
/// Per-source, per-day fetch result (served / rate-limited / etc).
pub mod outcome;
/// FCP-PM Orchestrator (C8): tier sequencing, merge, cache write-back.
pub mod orchestrator;

/// Public Query Façade (C9): validation, alignment, output policy.
pub mod facade;

pub use catalog::{Interval, MarketClass, Provider};
pub use core::{Bar, BarSeries, EngineConfig, EngineContext, EngineError};
pub use core::config::SourceOverride;
pub use time::Window;
