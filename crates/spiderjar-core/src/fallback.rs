//! Embedded placeholder jar served when every mirror fails.
//!
//! The archive is a minimal, well-formed jar (manifest only). TVBox accepts
//! it without crashing; spider-backed sites simply stay empty until a real
//! jar is resolved.

use std::sync::{Arc, OnceLock};
use std::time::SystemTime;

use crate::checksum::sha256_hex;
use crate::result::{JarOrigin, ResolutionResult};

/// Hex encoding of the placeholder archive.
const FALLBACK_JAR_HEX: &str = concat!(
    "504b030414000000000000002158000000000000000000000000090000004d4554412d494e462f50",
    "4b03041400000008000000215886d5aa4b3200000030000000140000004d4554412d494e462f4d41",
    "4e49464553542e4d46f34dcccb4c4b2d2ed10d4b2d2acecccfb35230d433e0e5722e4a4d2c494dd1",
    "75aab452282ec84c492dca4a2ce2e5e2e50200504b01021403140000000000000021580000000000",
    "000000000000000900000000000000000000008001000000004d4554412d494e462f504b01021403",
    "1400000008000000215886d5aa4b3200000030000000140000000000000000000000800127000000",
    "4d4554412d494e462f4d414e49464553542e4d46504b05060000000002000200790000008b000000",
    "0000",
);

struct Embedded {
    bytes: Arc<[u8]>,
    sha256: String,
}

fn embedded() -> &'static Embedded {
    static EMBEDDED: OnceLock<Embedded> = OnceLock::new();
    EMBEDDED.get_or_init(|| {
        let bytes = hex::decode(FALLBACK_JAR_HEX).expect("embedded fallback jar is valid hex");
        let sha256 = sha256_hex(&bytes);
        Embedded {
            bytes: Arc::from(bytes),
            sha256,
        }
    })
}

/// Raw placeholder bytes.
pub fn fallback_bytes() -> &'static [u8] {
    &embedded().bytes
}

/// SHA-256 of the placeholder, lowercase hex.
pub fn fallback_sha256() -> &'static str {
    &embedded().sha256
}

/// Build the fallback result. `tried` is the number of mirrors attempted first.
pub fn fallback_result(now: SystemTime, tried: usize) -> ResolutionResult {
    let e = embedded();
    ResolutionResult {
        bytes: Arc::clone(&e.bytes),
        sha256: e.sha256.clone(),
        origin: JarOrigin::Fallback,
        success: false,
        cached: false,
        created_at: now,
        size: e.bytes.len(),
        tried,
    }
}
