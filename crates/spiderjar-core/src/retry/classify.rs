//! Classify HTTP statuses and fetch errors into retry policy error kinds.

use super::policy::ErrorKind;
use crate::fetch::FetchError;

/// Classify a non-2xx HTTP status code for retry decisions.
pub fn classify_http_status(code: u32) -> ErrorKind {
    let code16 = u16::try_from(code).unwrap_or(u16::MAX);
    match code {
        403 | 404 | 410 => ErrorKind::Absent(code16),
        429 | 503 => ErrorKind::Throttled,
        500..=599 => ErrorKind::Http5xx(code16),
        _ => ErrorKind::HttpStatus(code16),
    }
}

/// Classify a fetch error into an ErrorKind.
pub fn classify(e: &FetchError) -> ErrorKind {
    match e {
        FetchError::Http(code) => classify_http_status(*code),
        FetchError::Timeout(_) => ErrorKind::Timeout,
        FetchError::Connection(_) | FetchError::Transport(_) => ErrorKind::Connection,
        FetchError::TooSmall { .. }
        | FetchError::TooLarge { .. }
        | FetchError::BadMagic
        | FetchError::ChecksumMismatch { .. } => ErrorKind::Invalid,
        FetchError::Cancelled => ErrorKind::Cancelled,
    }
}
