//! Diagnostics: probe every candidate once and turn a status into hints.
//!
//! Probing is read-only with respect to resolver state: no retries, no
//! blacklist updates, no cache writes. Runs on the current thread (call from
//! `spawn_blocking` if used from async).

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::fetch::{validate_jar, FetchError, RemoteFetcher};
use crate::mirrors::MirrorCandidate;
use crate::result::ResolutionStatus;

/// Artifacts below this size are suspicious even if structurally valid.
pub const SMALL_JAR_BYTES: usize = 50_000;

/// How one probe ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeOutcome {
    Success,
    Failed,
    Timeout,
    /// Body arrived but failed the structural or checksum check.
    Invalid,
}

impl ProbeOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            ProbeOutcome::Success => "success",
            ProbeOutcome::Failed => "failed",
            ProbeOutcome::Timeout => "timeout",
            ProbeOutcome::Invalid => "invalid",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProbeResult {
    pub url: String,
    pub outcome: ProbeOutcome,
    pub elapsed_ms: u64,
    /// HTTP status when the server answered with a non-2xx code.
    pub http_status: Option<u32>,
    pub size: Option<usize>,
    pub sha256: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProbeSummary {
    pub tested: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub average_ms: u64,
    /// Quickest successful candidate.
    pub fastest: Option<String>,
    /// First successful candidate in resolution order.
    pub recommended: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    pub results: Vec<ProbeResult>,
    pub summary: ProbeSummary,
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

fn probe_one(fetcher: &RemoteFetcher, candidate: &MirrorCandidate) -> ProbeResult {
    let settings = fetcher.settings();
    let start = Instant::now();
    let fetched = fetcher.client().get(&candidate.url, settings.timeout);
    let elapsed_ms = millis(start.elapsed());

    let mut result = ProbeResult {
        url: candidate.url.clone(),
        outcome: ProbeOutcome::Failed,
        elapsed_ms,
        http_status: None,
        size: None,
        sha256: None,
        error: None,
    };
    match fetched {
        Ok(bytes) => {
            result.size = Some(bytes.len());
            match validate_jar(&bytes, settings.min_bytes, candidate.sha256.as_deref()) {
                Ok(sha) => {
                    result.outcome = ProbeOutcome::Success;
                    result.sha256 = Some(sha);
                }
                Err(e) => {
                    result.outcome = ProbeOutcome::Invalid;
                    result.error = Some(e.to_string());
                }
            }
        }
        Err(e) => {
            result.outcome = match e {
                FetchError::Timeout(_) => ProbeOutcome::Timeout,
                _ => ProbeOutcome::Failed,
            };
            if let FetchError::Http(code) = e {
                result.http_status = Some(code);
            }
            result.error = Some(e.to_string());
        }
    }
    tracing::debug!(
        url = %result.url,
        outcome = result.outcome.as_str(),
        elapsed_ms = result.elapsed_ms,
        "probed mirror"
    );
    result
}

fn summarize(results: &[ProbeResult]) -> ProbeSummary {
    let ok: Vec<&ProbeResult> = results
        .iter()
        .filter(|r| r.outcome == ProbeOutcome::Success)
        .collect();
    let average_ms = if results.is_empty() {
        0
    } else {
        results.iter().map(|r| r.elapsed_ms).sum::<u64>() / results.len() as u64
    };
    ProbeSummary {
        tested: results.len(),
        succeeded: ok.len(),
        failed: results.len() - ok.len(),
        average_ms,
        fastest: ok.iter().min_by_key(|r| r.elapsed_ms).map(|r| r.url.clone()),
        recommended: ok.first().map(|r| r.url.clone()),
    }
}

/// Try each candidate once, in order, and report per-mirror outcomes.
pub fn probe_all(fetcher: &RemoteFetcher, candidates: &[MirrorCandidate]) -> ProbeReport {
    let results: Vec<ProbeResult> = candidates.iter().map(|c| probe_one(fetcher, c)).collect();
    let summary = summarize(&results);
    ProbeReport { results, summary }
}

/// Operator hints for the current cache state.
pub fn recommendations(status: &ResolutionStatus) -> Vec<String> {
    let mut out = Vec::new();
    if status.is_fallback {
        out.push(
            "All mirrors failed; serving the embedded fallback jar. Check network access to the mirror hosts."
                .to_string(),
        );
    }
    if status.success && status.tried > 3 {
        out.push(format!(
            "Resolution needed {} attempts; consider reordering mirrors for this region.",
            status.tried
        ));
    }
    if status.success && status.tried > 1 && is_github_origin(status.origin.as_str()) {
        out.push(
            "Reached a GitHub-hosted mirror only after earlier failures; domestic mirrors may be unreachable."
                .to_string(),
        );
    }
    if status.size < SMALL_JAR_BYTES {
        out.push(format!(
            "Artifact is only {} bytes; it may be incomplete or a placeholder.",
            status.size
        ));
    }
    out
}

fn is_github_origin(url: &str) -> bool {
    MirrorCandidate::new(url).is_github_hosted()
}
