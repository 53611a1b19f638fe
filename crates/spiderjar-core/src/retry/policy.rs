use std::time::Duration;

use crate::config::RetryConfig;

/// High-level classification of a fetch failure for retry purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operation timed out (connect/read/total).
    Timeout,
    /// Server asked us to slow down (e.g. 429, 503).
    Throttled,
    /// Network-level failure (connection reset, DNS, TLS, etc.).
    Connection,
    /// 5xx other than 503.
    Http5xx(u16),
    /// Any other non-2xx status that does not mean "absent".
    HttpStatus(u16),
    /// 403/404/410: the resource is gone or forbidden on this mirror.
    Absent(u16),
    /// Body arrived but failed structural checks.
    Invalid,
    /// Caller asked us to stop.
    Cancelled,
}

impl ErrorKind {
    pub fn is_retryable(&self) -> bool {
        match self {
            ErrorKind::Timeout
            | ErrorKind::Throttled
            | ErrorKind::Connection
            | ErrorKind::Http5xx(_)
            | ErrorKind::HttpStatus(_) => true,
            ErrorKind::Absent(_) | ErrorKind::Invalid | ErrorKind::Cancelled => false,
        }
    }
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry this error.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Linear backoff with a small attempt budget.
///
/// Mirrors are cheap to abandon (there is always another one), so the
/// defaults allow a single retry.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Delay unit; the n-th retry waits `backoff * n`.
    pub backoff: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            backoff: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(cfg: &RetryConfig) -> Self {
        let secs = if cfg.backoff_secs.is_finite() {
            cfg.backoff_secs.clamp(0.0, 60.0)
        } else {
            0.0
        };
        let backoff = Duration::from_secs_f64(secs);
        Self {
            max_attempts: cfg.max_attempts.max(1),
            backoff,
            max_delay: RetryPolicy::default().max_delay.max(backoff),
        }
    }
}

impl RetryPolicy {
    /// `attempt` is 1-based (1 = first attempt). Returns `RetryDecision::NoRetry`
    /// when we should stop retrying.
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if attempt >= self.max_attempts || !kind.is_retryable() {
            return RetryDecision::NoRetry;
        }
        let delay = self.backoff.saturating_mul(attempt).min(self.max_delay);
        RetryDecision::RetryAfter(delay)
    }
}
