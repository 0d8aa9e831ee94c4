use std::fs::OpenOptions;
use std::path::PathBuf;

use chrono::Utc;
use fs2::FileExt;
use tracing::{debug, warn};

use crate::core::Bar;
use crate::core::error::EngineError;
use crate::daypack::{self, DayPackView};

use super::key::CacheKey;

const EXT: &str = "bkp";

/// Result of a cache lookup (spec §4.4 `get`).
pub enum CacheHit {
    Hit(DayPackView),
    Miss,
}

/// Content-addressed on-disk directory of day-packs (spec §4.4).
///
/// Readers are unbounded (mmap open is just a syscall); at most one writer
/// per [`CacheKey`] is enforced by a per-file advisory lock held for the
/// duration of the write, so a write-in-progress for key K never blocks
/// readers for a different key.
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    #[must_use]
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    /// O(1) path resolution + mmap open; returns a zero-copy view.
    /// Corrupt files are reported as an error so the caller can quarantine
    /// or purge them; they are never silently treated as a miss by this
    /// method (the orchestrator decides that policy, per spec §7
    /// `corrupt-cache-file`).
    pub fn get(&self, key: &CacheKey) -> Result<CacheHit, EngineError> {
        let path = key.path(&self.root, EXT);
        if !path.exists() {
            return Ok(CacheHit::Miss);
        }
        match DayPackView::open(&path) {
            Ok(view) => Ok(CacheHit::Hit(view)),
            Err(e) => {
                warn!(key = %key.display(), error = %e, "corrupt cache file");
                Err(e)
            }
        }
    }

    /// Remove a cache file known to be corrupt, per spec §7
    /// `corrupt-cache-file`: "file is quarantined or removed; the fetch
    /// proceeds as if cache missed."
    pub fn quarantine(&self, key: &CacheKey) -> std::io::Result<()> {
        let path = key.path(&self.root, EXT);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Write `bars` for `key`. Accepted only when (spec §4.4):
    /// (a) the day is closed (`D < today-UTC`),
    /// (b) the pack is non-empty,
    /// (c) the bar count equals the expected count for `(day, interval)`,
    ///     or `complete_but_sparse` is set by the caller (the source
    ///     flagged the day as definitively complete-but-sparse).
    ///
    /// Overwrite of an existing file is forbidden — cache files are
    /// immutable; an existing file means "already done" (spec §4.4).
    pub fn put(&self, key: &CacheKey, bars: &[Bar], complete_but_sparse: bool) -> Result<(), EngineError> {
        let now = Utc::now();
        if !key.day.is_closed(now) {
            return Err(EngineError::InvalidInput(format!(
                "refusing to cache open day {} for {}",
                key.day.format_ymd(),
                key.display()
            )));
        }
        if bars.is_empty() {
            return Err(EngineError::InvalidInput(format!(
                "refusing to cache empty pack for {}",
                key.display()
            )));
        }
        if !complete_but_sparse && !daypack::is_complete_for_day(bars, key.interval) {
            return Err(EngineError::InvalidInput(format!(
                "refusing to cache incomplete pack for {} ({} bars)",
                key.display(),
                bars.len()
            )));
        }
        daypack::validate_invariants(bars, key.interval)?;

        let path = key.path(&self.root, EXT);
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(EngineError::Io)?;
        }
        let lock_path = path.with_extension(format!("{EXT}.lock"));
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(EngineError::Io)?;
        lock_file.lock_exclusive().map_err(EngineError::Io)?;

        let result = if path.exists() {
            debug!(key = %key.display(), "cache file already present, treating as already-done");
            Ok(())
        } else {
            daypack::atomic_write(&path, bars)
        };

        let _ = fs2::FileExt::unlock(&lock_file);
        result
    }

    /// Ordered set of dates present for `(provider, market, symbol,
    /// interval)` (spec §4.4 `list`).
    #[must_use]
    pub fn list(&self, provider: crate::catalog::Provider, market: crate::catalog::MarketClass, symbol: &str, interval: crate::catalog::Interval) -> Vec<chrono::NaiveDate> {
        let dir = self
            .root
            .join(provider.name())
            .join(market.canonical_path_segment())
            .join("klines")
            .join("daily")
            .join(symbol)
            .join(interval.canonical_name());

        let Ok(entries) = std::fs::read_dir(&dir) else {
            return Vec::new();
        };
        let mut dates: Vec<chrono::NaiveDate> = entries
            .filter_map(Result::ok)
            .filter_map(|e| {
                let name = e.file_name();
                let name = name.to_str()?;
                let stem = name.strip_suffix(&format!(".{EXT}"))?;
                chrono::NaiveDate::parse_from_str(stem, "%Y-%m-%d").ok()
            })
            .collect();
        dates.sort();
        dates
    }

    /// Administrative bulk purge of every file under `prefix` (relative to
    /// the cache root). Requires no additional locking: individual files
    /// are atomically created/removed (spec §4.4, §5).
    pub fn purge(&self, prefix: &std::path::Path) -> std::io::Result<()> {
        let full = self.root.join(prefix);
        if full.exists() {
            std::fs::remove_dir_all(full)?;
        }
        Ok(())
    }
}
