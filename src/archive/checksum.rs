use sha2::{Digest, Sha256};

use crate::core::error::EngineError;

/// Parse a `.CHECKSUM` file body (`<hex-digest>  <filename>`, whitespace
/// separated) and return the expected hex digest.
pub fn parse_expected_digest(checksum_text: &str, key: &str) -> Result<String, EngineError> {
    checksum_text
        .split_whitespace()
        .next()
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| EngineError::Integrity {
            key: key.to_string(),
            reason: "empty or malformed checksum file".to_string(),
        })
}

/// Verify `data` hashes to `expected_hex` (case-insensitive).
pub fn verify(data: &[u8], expected_hex: &str, key: &str) -> Result<(), EngineError> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let computed = format!("{:x}", hasher.finalize());
    if computed.eq_ignore_ascii_case(expected_hex) {
        Ok(())
    } else {
        Err(EngineError::Integrity {
            key: key.to_string(),
            reason: format!("sha256 mismatch: expected {expected_hex}, computed {computed}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_standard_checksum_line() {
        let body = "deadbeef  BTCUSDT-1m-2024-01-01.zip\n";
        assert_eq!(parse_expected_digest(body, "k").unwrap(), "deadbeef");
    }

    #[test]
    fn verify_detects_mismatch() {
        let digest = parse_expected_digest("00  f.zip", "k").unwrap();
        assert!(verify(b"hello", &digest, "k").is_err());
    }

    #[test]
    fn verify_accepts_correct_digest() {
        let mut hasher = Sha256::new();
        hasher.update(b"hello");
        let hex = format!("{:x}", hasher.finalize());
        assert!(verify(b"hello", &hex, "k").is_ok());
    }
}
