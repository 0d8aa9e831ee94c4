//! Time Arithmetic (C2): interval granularity, boundary alignment, day-pack
//! windowing, gap arithmetic on half-open ranges. All times are UTC,
//! millisecond precision (spec §4.2).

mod align;
mod window;

pub use align::{align, day_of, days_covering, expected_count, expected_count_in_window, floor};
pub use window::{Day, Window};
