//! Columnar Day-Pack Codec (C3): encodes/decodes one UTC-day of bars to a
//! memory-mappable columnar file, with atomic write and schema discipline
//! (spec §4.3).

mod codec;
mod schema;

pub use codec::{DayPackView, atomic_write, decode, encode, validate_header};
pub use schema::{HEADER_LEN, MAGIC, ROW_WIDTH, SCHEMA_VERSION};

use crate::catalog::Interval;
use crate::core::Bar;
use crate::core::error::EngineError;
use crate::time::expected_count;

/// Validate the DayPack invariants from spec §3: monotonically strictly
/// increasing open-times, all open-times aligned to interval boundaries.
pub fn validate_invariants(bars: &[Bar], interval: Interval) -> Result<(), EngineError> {
    let step = interval.millis();
    for w in bars.windows(2) {
        if w[1].open_time <= w[0].open_time {
            return Err(EngineError::CorruptCacheFile {
                path: String::new(),
                reason: "open-times not strictly increasing".to_string(),
            });
        }
    }
    if let Some(bad) = bars.iter().find(|b| b.open_time % step != 0) {
        return Err(EngineError::CorruptCacheFile {
            path: String::new(),
            reason: format!("open-time {} not aligned to interval", bad.open_time),
        });
    }
    Ok(())
}

/// Whether `bars` form a complete pack for a full closed day at `interval`
/// (spec §4.4 `put`: "pack's bar count equals the expected count").
#[must_use]
pub fn is_complete_for_day(bars: &[Bar], interval: Interval) -> bool {
    bars.len() as i64 == expected_count(interval)
}
