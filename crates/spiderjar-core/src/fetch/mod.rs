//! Remote jar fetching: one-shot HTTP GETs, structural validation, and the
//! retrying per-candidate fetcher the resolver drives.

mod curl_client;
mod remote;
mod validate;

use std::time::Duration;

pub use curl_client::CurlFetcher;
pub use remote::{FetchSettings, FetchedJar, RemoteFetcher};
pub use validate::{has_zip_magic, validate_jar, ZIP_MAGIC};

/// Why a single fetch attempt (or the whole candidate) failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// Connect or transfer deadline passed.
    #[error("timed out: {0}")]
    Timeout(String),
    /// DNS, connect, reset, TLS handshake and similar.
    #[error("connection failed: {0}")]
    Connection(String),
    /// Any other client-side transport failure.
    #[error("transport error: {0}")]
    Transport(String),
    #[error("body too small: {len} bytes (minimum {min})")]
    TooSmall { len: usize, min: usize },
    #[error("body exceeds {limit} bytes")]
    TooLarge { limit: usize },
    #[error("not a jar: missing ZIP signature")]
    BadMagic,
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },
    #[error("cancelled")]
    Cancelled,
}

/// A single HTTP GET of a candidate URL. Implementations return the full body
/// on a 2xx response and `FetchError::Http` for any other status. No retries
/// and no content checks happen at this level.
pub trait JarFetcher: Send + Sync {
    fn get(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, FetchError>;
}
