//! The value the resolver hands out, and its byte-less status view.

use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

use serde::{Serialize, Serializer};

use crate::clock::unix_millis;

/// Where a resolved jar came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JarOrigin {
    /// URL of the mirror that served the accepted body.
    Mirror(String),
    /// The embedded placeholder.
    Fallback,
}

impl JarOrigin {
    pub const FALLBACK: &'static str = "fallback";

    pub fn as_str(&self) -> &str {
        match self {
            JarOrigin::Mirror(url) => url,
            JarOrigin::Fallback => Self::FALLBACK,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, JarOrigin::Fallback)
    }
}

impl fmt::Display for JarOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for JarOrigin {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Outcome of one resolution: the artifact plus how it was obtained.
#[derive(Debug, Clone)]
pub struct ResolutionResult {
    /// Artifact bytes; shared so cache hits do not copy the payload.
    pub bytes: Arc<[u8]>,
    /// SHA-256 of `bytes`, lowercase hex.
    pub sha256: String,
    pub origin: JarOrigin,
    /// True only when a remote mirror supplied the bytes.
    pub success: bool,
    /// True when served from the cache slot rather than computed by this call.
    pub cached: bool,
    pub created_at: SystemTime,
    pub size: usize,
    /// Candidates attempted before this result was settled.
    pub tried: usize,
}

impl ResolutionResult {
    pub fn is_fallback(&self) -> bool {
        self.origin.is_fallback()
    }

    pub fn status(&self) -> ResolutionStatus {
        ResolutionStatus {
            sha256: self.sha256.clone(),
            origin: self.origin.clone(),
            success: self.success,
            cached: self.cached,
            is_fallback: self.is_fallback(),
            timestamp_ms: unix_millis(self.created_at),
            size: self.size,
            tried: self.tried,
        }
    }
}

/// `ResolutionResult` without the payload, for diagnostics output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionStatus {
    pub sha256: String,
    #[serde(rename = "source")]
    pub origin: JarOrigin,
    pub success: bool,
    pub cached: bool,
    pub is_fallback: bool,
    /// Creation time, milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
    pub size: usize,
    pub tried: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_strings() {
        assert_eq!(JarOrigin::Fallback.as_str(), "fallback");
        assert_eq!(JarOrigin::Mirror("https://m/a.jar".into()).to_string(), "https://m/a.jar");
    }

    #[test]
    fn status_serializes_without_bytes() {
        let r = ResolutionResult {
            bytes: Arc::from(vec![b'P', b'K', 3, 4]),
            sha256: "abc".into(),
            origin: JarOrigin::Mirror("https://m/a.jar".into()),
            success: true,
            cached: false,
            created_at: SystemTime::UNIX_EPOCH,
            size: 4,
            tried: 1,
        };
        let json = serde_json::to_value(r.status()).unwrap();
        assert_eq!(json["source"], "https://m/a.jar");
        assert_eq!(json["success"], true);
        assert_eq!(json["is_fallback"], false);
        assert_eq!(json["size"], 4);
        assert!(json.get("bytes").is_none());
    }
}
