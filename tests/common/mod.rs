#![allow(dead_code)]

use std::io::{Cursor, Write};

use sha2::{Digest, Sha256};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Build a single-entry zip archive in memory, the same shape Binance's
/// archive serves (one CSV per zip).
#[must_use]
pub fn make_zip(entry_name: &str, body: &str) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let cursor = Cursor::new(&mut buf);
        let mut writer = ZipWriter::new(cursor);
        let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        writer.start_file(entry_name, options).expect("start_file");
        writer.write_all(body.as_bytes()).expect("write zip entry");
        writer.finish().expect("finish zip");
    }
    buf
}

#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// A plausible Binance daily-kline CSV body for one hourly bar, open-time
/// at UTC midnight of `day_ms`.
#[must_use]
pub fn sample_kline_csv_row(open_time_ms: i64) -> String {
    format!("{open_time_ms},100.0,101.0,99.0,100.5,10.0,{},500.0,12,5.0,250.0,0\n", open_time_ms + 3_599_999)
}
