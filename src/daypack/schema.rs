/// Self-describing columnar layout for one day-pack file (spec §4.3).
///
/// Fixed header, then six fixed-width columns in row-major-per-column
/// (struct-of-arrays) layout, so the `open_time` column alone can be
/// memory-mapped and scanned without touching OHLCV bytes.
///
/// Header layout (little-endian):
/// - bytes 0..4:   magic `b"BKP1"`
/// - bytes 4..8:   schema version (u32), currently `1`
/// - bytes 8..16:  row count (u64)
pub const MAGIC: [u8; 4] = *b"BKP1";
pub const SCHEMA_VERSION: u32 = 1;
pub const HEADER_LEN: usize = 16;

/// Byte width of one row across all six columns (open_time: i64, then five
/// f64 columns).
pub const ROW_WIDTH: usize = 8 * 6;

#[must_use]
pub fn file_len_for_rows(rows: usize) -> usize {
    HEADER_LEN + rows * ROW_WIDTH
}
