use memmap2::Mmap;
use rand::Rng;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::core::Bar;
use crate::core::error::EngineError;

use super::schema::{HEADER_LEN, MAGIC, ROW_WIDTH, SCHEMA_VERSION, file_len_for_rows};

/// Encode `bars` into the columnar wire format described in
/// `schema` (spec §4.3). Does not write anything to disk; pairs with
/// [`atomic_write`] for the persistence step.
#[must_use]
pub fn encode(bars: &[Bar]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(file_len_for_rows(bars.len()));
    buf.extend_from_slice(&MAGIC);
    buf.extend_from_slice(&SCHEMA_VERSION.to_le_bytes());
    buf.extend_from_slice(&(bars.len() as u64).to_le_bytes());
    for bar in bars {
        buf.extend_from_slice(&bar.open_time.to_le_bytes());
        buf.extend_from_slice(&bar.open.to_le_bytes());
        buf.extend_from_slice(&bar.high.to_le_bytes());
        buf.extend_from_slice(&bar.low.to_le_bytes());
        buf.extend_from_slice(&bar.close.to_le_bytes());
        buf.extend_from_slice(&bar.volume.to_le_bytes());
    }
    buf
}

/// Decode a byte slice (typically an mmap view) back into owned `Bar`s.
/// Schema mismatch is a fatal corruption error for that file (spec §4.3).
pub fn decode(bytes: &[u8]) -> Result<Vec<Bar>, EngineError> {
    let count = validate_header(bytes)?;
    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        out.push(read_row(bytes, i));
    }
    Ok(out)
}

/// Validate the header and return the row count, without decoding rows.
/// Used by the cache store to cheaply reject corrupt files.
pub fn validate_header(bytes: &[u8]) -> Result<usize, EngineError> {
    if bytes.len() < HEADER_LEN {
        return Err(EngineError::CorruptCacheFile {
            path: String::new(),
            reason: "file shorter than header".to_string(),
        });
    }
    if bytes[0..4] != MAGIC {
        return Err(EngineError::CorruptCacheFile {
            path: String::new(),
            reason: "bad magic".to_string(),
        });
    }
    let version = u32::from_le_bytes(bytes[4..8].try_into().expect("4 bytes"));
    if version != SCHEMA_VERSION {
        return Err(EngineError::CorruptCacheFile {
            path: String::new(),
            reason: format!("unsupported schema version {version}"),
        });
    }
    let count = u64::from_le_bytes(bytes[8..16].try_into().expect("8 bytes")) as usize;
    let expected_len = file_len_for_rows(count);
    if bytes.len() != expected_len {
        return Err(EngineError::CorruptCacheFile {
            path: String::new(),
            reason: format!("length mismatch: expected {expected_len}, got {}", bytes.len()),
        });
    }
    Ok(count)
}

fn read_row(bytes: &[u8], index: usize) -> Bar {
    let base = HEADER_LEN + index * ROW_WIDTH;
    let f = |off: usize| f64::from_le_bytes(bytes[base + off..base + off + 8].try_into().expect("8 bytes"));
    Bar {
        open_time: i64::from_le_bytes(bytes[base..base + 8].try_into().expect("8 bytes")),
        open: f(8),
        high: f(16),
        low: f(24),
        close: f(32),
        volume: f(40),
    }
}

/// Memory-mapped read-only view over a day-pack file. The map stays valid
/// for the lifetime of this handle even if the underlying file is later
/// unlinked, because the inode remains live (spec §9).
pub struct DayPackView {
    mmap: Mmap,
}

impl DayPackView {
    /// Open and mmap `path`. Returns a `CorruptCacheFile` error if the
    /// header or length is inconsistent.
    pub fn open(path: &Path) -> Result<Self, EngineError> {
        let file = File::open(path).map_err(EngineError::Io)?;
        // SAFETY: day-pack files are immutable once written (spec §3, §4.4);
        // no other writer will mutate this file's bytes while mapped.
        let mmap = unsafe { Mmap::map(&file) }.map_err(EngineError::Io)?;
        validate_header(&mmap).map_err(|e| match e {
            EngineError::CorruptCacheFile { reason, .. } => EngineError::CorruptCacheFile {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })?;
        Ok(Self { mmap })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        u64::from_le_bytes(self.mmap[8..16].try_into().expect("8 bytes")) as usize
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn bar(&self, index: usize) -> Bar {
        read_row(&self.mmap, index)
    }

    /// Materialize all bars as an owned `Vec`. Each row is read directly out
    /// of the mapped pages; no intermediate deserialization buffer.
    #[must_use]
    pub fn bars(&self) -> Vec<Bar> {
        (0..self.len()).map(|i| self.bar(i)).collect()
    }
}

/// Write protocol (spec §4.3):
/// 1. serialize to `<final>.tmp.<random>` in the same directory
/// 2. fsync the temp file
/// 3. rename temp -> final (atomic within the filesystem)
/// 4. fsync the directory
///
/// Fails with `AlreadyExists` (via `std::io::Error`) if `final_path` already
/// exists, since day-pack files are immutable once written (spec §4.4).
pub fn atomic_write(final_path: &Path, bars: &[Bar]) -> Result<(), EngineError> {
    if final_path.exists() {
        return Err(EngineError::Io(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("day-pack already exists at {}", final_path.display()),
        )));
    }
    let dir = final_path.parent().ok_or_else(|| {
        EngineError::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, "no parent directory"))
    })?;
    std::fs::create_dir_all(dir).map_err(EngineError::Io)?;

    let suffix: u64 = rand::thread_rng().r#gen();
    let tmp_path = final_path.with_extension(format!(
        "{}.tmp.{suffix:016x}",
        final_path.extension().and_then(|e| e.to_str()).unwrap_or("bin")
    ));

    let bytes = encode(bars);
    {
        let mut tmp_file = File::create(&tmp_path).map_err(EngineError::Io)?;
        tmp_file.write_all(&bytes).map_err(EngineError::Io)?;
        tmp_file.sync_all().map_err(EngineError::Io)?;
    }

    std::fs::rename(&tmp_path, final_path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp_path);
        EngineError::Io(e)
    })?;

    if let Ok(dir_file) = File::open(dir) {
        let _ = dir_file.sync_all();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bars() -> Vec<Bar> {
        (0..24)
            .map(|h| Bar {
                open_time: h * 3_600_000,
                open: 100.0 + h as f64,
                high: 101.0 + h as f64,
                low: 99.0 + h as f64,
                close: 100.5 + h as f64,
                volume: 10.0,
            })
            .collect()
    }

    #[test]
    fn round_trip_encode_decode() {
        let bars = sample_bars();
        let encoded = encode(&bars);
        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded, bars);
    }

    #[test]
    fn atomic_write_then_mmap_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("2024-01-15.bkp");
        let bars = sample_bars();
        atomic_write(&path, &bars).unwrap();

        let view = DayPackView::open(&path).unwrap();
        assert_eq!(view.len(), bars.len());
        assert_eq!(view.bars(), bars);
    }

    #[test]
    fn rewrite_of_existing_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("2024-01-15.bkp");
        let bars = sample_bars();
        atomic_write(&path, &bars).unwrap();
        let err = atomic_write(&path, &bars).unwrap_err();
        assert!(matches!(err, EngineError::Io(_)));
    }

    #[test]
    fn corrupt_header_is_rejected() {
        let bytes = vec![0u8; 4];
        assert!(decode(&bytes).is_err());
    }
}
