//! Retry loop: run a closure until success or policy says stop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use super::classify;
use super::policy::{RetryDecision, RetryPolicy};
use crate::fetch::FetchError;

/// Granularity at which backoff sleeps re-check the abort token.
const SLEEP_SLICE: Duration = Duration::from_millis(50);

/// Sleeps for `d` unless `abort` is raised first. Returns false if aborted.
pub fn sleep_unless_aborted(d: Duration, abort: &AtomicBool) -> bool {
    let deadline = Instant::now() + d;
    loop {
        if abort.load(Ordering::Relaxed) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        std::thread::sleep((deadline - now).min(SLEEP_SLICE));
    }
}

/// Runs `f` until it succeeds or the retry policy says to stop.
/// `f` receives the 1-based attempt number. On retryable failure, sleeps for
/// the backoff duration then tries again; an abort during the sleep ends the
/// loop with `FetchError::Cancelled`.
pub fn run_with_retry<T, F>(
    policy: &RetryPolicy,
    abort: &AtomicBool,
    mut f: F,
) -> Result<T, FetchError>
where
    F: FnMut(u32) -> Result<T, FetchError>,
{
    let mut attempt = 1u32;
    loop {
        if abort.load(Ordering::Relaxed) {
            return Err(FetchError::Cancelled);
        }
        match f(attempt) {
            Ok(v) => return Ok(v),
            Err(e) => {
                let kind = classify::classify(&e);
                match policy.decide(attempt, kind) {
                    RetryDecision::NoRetry => return Err(e),
                    RetryDecision::RetryAfter(d) => {
                        let delay_ms = d.as_millis() as u64;
                        tracing::debug!(attempt, ?kind, delay_ms, "retrying: {}", e);
                        if !sleep_unless_aborted(d, abort) {
                            return Err(FetchError::Cancelled);
                        }
                        attempt += 1;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            backoff: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    #[test]
    fn succeeds_after_retryable_failure() {
        let abort = AtomicBool::new(false);
        let mut calls = 0;
        let out = run_with_retry(&fast(3), &abort, |_| {
            calls += 1;
            if calls < 2 {
                Err(FetchError::Http(502))
            } else {
                Ok(42)
            }
        });
        assert_eq!(out.unwrap(), 42);
        assert_eq!(calls, 2);
    }

    #[test]
    fn absent_is_not_retried() {
        let abort = AtomicBool::new(false);
        let mut calls = 0;
        let out: Result<(), _> = run_with_retry(&fast(5), &abort, |_| {
            calls += 1;
            Err(FetchError::Http(404))
        });
        assert!(matches!(out, Err(FetchError::Http(404))));
        assert_eq!(calls, 1);
    }

    #[test]
    fn budget_exhausted_returns_last_error() {
        let abort = AtomicBool::new(false);
        let mut seen = Vec::new();
        let out: Result<(), _> = run_with_retry(&fast(2), &abort, |attempt| {
            seen.push(attempt);
            Err(FetchError::Timeout("slow".into()))
        });
        assert!(matches!(out, Err(FetchError::Timeout(_))));
        assert_eq!(seen, vec![1, 2]);
    }

    #[test]
    fn abort_before_start_cancels() {
        let abort = AtomicBool::new(true);
        let out: Result<(), _> = run_with_retry(&fast(3), &abort, |_| Ok(()));
        assert!(matches!(out, Err(FetchError::Cancelled)));
    }

    #[test]
    fn sleep_returns_early_when_aborted() {
        let abort = AtomicBool::new(true);
        let start = Instant::now();
        assert!(!sleep_unless_aborted(Duration::from_secs(10), &abort));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn sleep_completes_without_abort() {
        let abort = AtomicBool::new(false);
        assert!(sleep_unless_aborted(Duration::from_millis(10), &abort));
    }
}
