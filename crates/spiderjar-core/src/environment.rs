//! Domestic vs international classification from weak request signals.
//!
//! Three independent signals are considered: the timezone, the preferred
//! language and the IP country reported by an edge proxy. At least two must
//! agree before a request is treated as domestic.

use serde::{Deserialize, Serialize};

/// IANA zones treated as domestic.
const DOMESTIC_TIMEZONES: &[&str] = &[
    "Asia/Shanghai",
    "Asia/Chongqing",
    "Asia/Chungking",
    "Asia/Harbin",
    "Asia/Urumqi",
    "Asia/Kashgar",
    "PRC",
];

/// Second subtags of a `zh` tag that mark mainland usage (region or script).
const DOMESTIC_ZH_SUBTAGS: &[&str] = &["cn", "hans"];

const DOMESTIC_COUNTRY: &str = "CN";

/// Which mirror table a request should prefer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Domestic,
    International,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Domestic => "domestic",
            Region::International => "international",
        }
    }
}

/// Raw signals, any of which may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvSignals {
    /// IANA timezone name, e.g. `Asia/Shanghai`.
    #[serde(default)]
    pub timezone: Option<String>,
    /// Raw `Accept-Language` header value.
    #[serde(default)]
    pub accept_language: Option<String>,
    /// Two-letter country code from an edge header such as `CF-IPCountry`.
    #[serde(default)]
    pub ip_country: Option<String>,
}

impl EnvSignals {
    /// Fill any missing signal from `defaults`.
    pub fn or(mut self, defaults: &EnvSignals) -> Self {
        if self.timezone.is_none() {
            self.timezone = defaults.timezone.clone();
        }
        if self.accept_language.is_none() {
            self.accept_language = defaults.accept_language.clone();
        }
        if self.ip_country.is_none() {
            self.ip_country = defaults.ip_country.clone();
        }
        self
    }
}

/// Per-signal match result, kept for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub region: Region,
    pub timezone_match: bool,
    pub language_match: bool,
    pub country_match: bool,
}

pub fn timezone_is_domestic(tz: &str) -> bool {
    let tz = tz.trim();
    DOMESTIC_TIMEZONES
        .iter()
        .any(|known| known.eq_ignore_ascii_case(tz))
}

/// True if any tag in an `Accept-Language` value is `zh-CN*` or `zh-Hans*`.
/// Extensions and further subtags are ignored. Quality weights are ignored;
/// a malformed list simply yields no match.
pub fn language_is_domestic(accept_language: &str) -> bool {
    accept_language
        .split(',')
        .filter_map(|part| part.split(';').next())
        .any(|tag| {
            let mut subtags = tag.trim().split(['-', '_']);
            let primary = subtags.next().unwrap_or("");
            let second = subtags.next().unwrap_or("");
            primary.eq_ignore_ascii_case("zh")
                && DOMESTIC_ZH_SUBTAGS
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(second))
        })
}

pub fn country_is_domestic(code: &str) -> bool {
    code.trim().eq_ignore_ascii_case(DOMESTIC_COUNTRY)
}

/// Classify with per-signal details. Missing signals count as non-matching.
pub fn classify_detailed(signals: &EnvSignals) -> Classification {
    let timezone_match = signals
        .timezone
        .as_deref()
        .is_some_and(timezone_is_domestic);
    let language_match = signals
        .accept_language
        .as_deref()
        .is_some_and(language_is_domestic);
    let country_match = signals
        .ip_country
        .as_deref()
        .is_some_and(country_is_domestic);

    let votes = [timezone_match, language_match, country_match]
        .iter()
        .filter(|m| **m)
        .count();
    let region = if votes >= 2 {
        Region::Domestic
    } else {
        Region::International
    };
    Classification {
        region,
        timezone_match,
        language_match,
        country_match,
    }
}

pub fn classify(signals: &EnvSignals) -> Region {
    classify_detailed(signals).region
}

/// Best-effort local timezone: `TZ`, then `/etc/timezone`, then the
/// `/etc/localtime` symlink target. `None` when nothing is readable.
pub fn local_timezone() -> Option<String> {
    if let Ok(tz) = std::env::var("TZ") {
        let tz = tz.trim().trim_start_matches(':').to_string();
        if !tz.is_empty() {
            return Some(tz);
        }
    }
    if let Ok(s) = std::fs::read_to_string("/etc/timezone") {
        let s = s.trim();
        if !s.is_empty() {
            return Some(s.to_string());
        }
    }
    let target = std::fs::read_link("/etc/localtime").ok()?;
    let target = target.to_string_lossy();
    target
        .split_once("zoneinfo/")
        .map(|(_, zone)| zone.to_string())
}
