//! Property tests for the Gap Analyzer (C7): gaps never overlap, stay
//! ordered, and never cross a UTC-day boundary, for arbitrary sets of owned
//! bars within a multi-day window.

use binance_klines_rs::catalog::Interval;
use binance_klines_rs::core::models::Bar;
use binance_klines_rs::gap;
use binance_klines_rs::time::Window;
use proptest::prelude::*;

const STEP: i64 = 3_600_000; // Interval::Hour1
const WINDOW_START: i64 = 0;
const WINDOW_HOURS: i64 = 72; // three days

fn bar_at(hour: i64) -> Bar {
    Bar {
        open_time: WINDOW_START + hour * STEP,
        open: 1.0,
        high: 1.0,
        low: 1.0,
        close: 1.0,
        volume: 1.0,
    }
}

proptest! {
    #[test]
    fn gaps_are_sorted_nonoverlapping_and_day_bounded(
        mut owned_hours in prop::collection::hash_set(0..WINDOW_HOURS, 0..40)
    ) {
        let mut hours: Vec<i64> = owned_hours.drain().collect();
        hours.sort_unstable();
        let owned: Vec<Bar> = hours.iter().map(|&h| bar_at(h)).collect();

        let window = Window { start_ms: WINDOW_START, end_ms: WINDOW_START + WINDOW_HOURS * STEP };
        let gaps = gap::analyze(window, Interval::Hour1, &owned);

        for pair in gaps.windows(2) {
            prop_assert!(pair[0].end_ms <= pair[1].start_ms, "gaps must not overlap or regress");
        }

        for g in &gaps {
            prop_assert!(g.start_ms < g.end_ms);
            prop_assert!(g.start_ms >= window.start_ms && g.end_ms <= window.end_ms);
            let day_start = (g.start_ms / 86_400_000) * 86_400_000;
            prop_assert!(g.end_ms - day_start <= 86_400_000, "gap must not cross a UTC-day boundary");
        }

        // Every owned open-time must fall outside every gap.
        for bar in &owned {
            for g in &gaps {
                prop_assert!(!(bar.open_time >= g.start_ms && bar.open_time < g.end_ms));
            }
        }
    }
}
