//! Structural sanity checks on a downloaded jar.
//!
//! This is deliberately shallow: a size floor, the ZIP signature, and an
//! optional pinned checksum. The archive is never parsed.

use super::FetchError;
use crate::checksum::sha256_hex;

/// First two bytes of a ZIP local file header.
pub const ZIP_MAGIC: [u8; 2] = *b"PK";

pub fn has_zip_magic(bytes: &[u8]) -> bool {
    bytes.starts_with(&ZIP_MAGIC)
}

/// Validate `bytes` and return their SHA-256 (hex) on success.
pub fn validate_jar(
    bytes: &[u8],
    min_len: usize,
    expected_sha256: Option<&str>,
) -> Result<String, FetchError> {
    if bytes.len() < min_len {
        return Err(FetchError::TooSmall {
            len: bytes.len(),
            min: min_len,
        });
    }
    if !has_zip_magic(bytes) {
        return Err(FetchError::BadMagic);
    }
    let actual = sha256_hex(bytes);
    if let Some(expected) = expected_sha256 {
        if !expected.eq_ignore_ascii_case(&actual) {
            return Err(FetchError::ChecksumMismatch {
                expected: expected.to_ascii_lowercase(),
                actual,
            });
        }
    }
    Ok(actual)
}
