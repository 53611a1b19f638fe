//! Per-candidate fetch: bounded GET, retry with backoff, validation, checksum.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use super::{validate_jar, FetchError, JarFetcher};
use crate::config::SpiderConfig;
use crate::mirrors::MirrorCandidate;
use crate::retry::{run_with_retry, RetryPolicy};

/// Knobs for one candidate fetch.
#[derive(Debug, Clone, Copy)]
pub struct FetchSettings {
    /// Deadline for each individual attempt.
    pub timeout: Duration,
    /// Bodies shorter than this are rejected.
    pub min_bytes: usize,
    pub retry: RetryPolicy,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            min_bytes: 1024,
            retry: RetryPolicy::default(),
        }
    }
}

impl FetchSettings {
    pub fn from_config(cfg: &SpiderConfig) -> Self {
        Self {
            timeout: Duration::from_secs(cfg.fetch.timeout_secs),
            min_bytes: cfg.fetch.min_jar_bytes,
            retry: cfg
                .retry
                .as_ref()
                .map(RetryPolicy::from)
                .unwrap_or_default(),
        }
    }
}

/// An accepted artifact.
#[derive(Debug, Clone)]
pub struct FetchedJar {
    pub bytes: Vec<u8>,
    pub sha256: String,
    /// HTTP attempts spent on this candidate (1 = no retry needed).
    pub attempts: u32,
}

/// Drives a `JarFetcher` for one candidate at a time.
pub struct RemoteFetcher {
    client: Arc<dyn JarFetcher>,
    settings: FetchSettings,
}

impl RemoteFetcher {
    pub fn new(client: Arc<dyn JarFetcher>, settings: FetchSettings) -> Self {
        Self { client, settings }
    }

    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    pub fn client(&self) -> &Arc<dyn JarFetcher> {
        &self.client
    }

    /// Fetch and validate one candidate. 403/404/410 and structural failures
    /// abandon the candidate immediately; timeouts, transport errors and
    /// other statuses are retried within the policy budget.
    pub fn fetch(
        &self,
        candidate: &MirrorCandidate,
        abort: &AtomicBool,
    ) -> Result<FetchedJar, FetchError> {
        let mut attempts = 0u32;
        let (bytes, sha256) = run_with_retry(&self.settings.retry, abort, |attempt| {
            attempts = attempt;
            let bytes = self.client.get(&candidate.url, self.settings.timeout)?;
            let sha256 = validate_jar(&bytes, self.settings.min_bytes, candidate.sha256.as_deref())?;
            Ok((bytes, sha256))
        })?;
        Ok(FetchedJar {
            bytes,
            sha256,
            attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays scripted responses and counts calls.
    struct Scripted {
        replies: Mutex<VecDeque<Result<Vec<u8>, FetchError>>>,
        calls: Mutex<u32>,
    }

    impl Scripted {
        fn new(replies: Vec<Result<Vec<u8>, FetchError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                calls: Mutex::new(0),
            })
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    impl JarFetcher for Scripted {
        fn get(&self, _url: &str, _timeout: Duration) -> Result<Vec<u8>, FetchError> {
            *self.calls.lock().unwrap() += 1;
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(FetchError::Http(500)))
        }
    }

    fn jar(len: usize) -> Vec<u8> {
        let mut v = vec![7u8; len];
        v[..2].copy_from_slice(b"PK");
        v
    }

    fn settings(max_attempts: u32) -> FetchSettings {
        FetchSettings {
            timeout: Duration::from_secs(1),
            min_bytes: 1024,
            retry: RetryPolicy {
                max_attempts,
                backoff: Duration::ZERO,
                max_delay: Duration::ZERO,
            },
        }
    }

    #[test]
    fn retries_timeout_then_succeeds() {
        let client = Scripted::new(vec![Err(FetchError::Timeout("t".into())), Ok(jar(4096))]);
        let fetcher = RemoteFetcher::new(client.clone(), settings(2));
        let got = fetcher
            .fetch(&MirrorCandidate::new("https://m/a.jar"), &AtomicBool::new(false))
            .unwrap();
        assert_eq!(got.attempts, 2);
        assert_eq!(got.bytes.len(), 4096);
        assert_eq!(client.calls(), 2);
    }

    #[test]
    fn not_found_abandons_immediately() {
        let client = Scripted::new(vec![Err(FetchError::Http(404)), Ok(jar(4096))]);
        let fetcher = RemoteFetcher::new(client.clone(), settings(3));
        let err = fetcher
            .fetch(&MirrorCandidate::new("https://m/a.jar"), &AtomicBool::new(false))
            .unwrap_err();
        assert_eq!(err, FetchError::Http(404));
        assert_eq!(client.calls(), 1);
    }

    #[test]
    fn truncated_body_is_not_retried() {
        let client = Scripted::new(vec![Ok(jar(100)), Ok(jar(4096))]);
        let fetcher = RemoteFetcher::new(client.clone(), settings(3));
        let err = fetcher
            .fetch(&MirrorCandidate::new("https://m/a.jar"), &AtomicBool::new(false))
            .unwrap_err();
        assert!(matches!(err, FetchError::TooSmall { len: 100, .. }));
        assert_eq!(client.calls(), 1);
    }

    #[test]
    fn retry_budget_exhausts() {
        let client = Scripted::new(vec![
            Err(FetchError::Timeout("a".into())),
            Err(FetchError::Timeout("b".into())),
            Ok(jar(4096)),
        ]);
        let fetcher = RemoteFetcher::new(client.clone(), settings(2));
        let err = fetcher
            .fetch(&MirrorCandidate::new("https://m/a.jar"), &AtomicBool::new(false))
            .unwrap_err();
        assert_eq!(err, FetchError::Timeout("b".into()));
        assert_eq!(client.calls(), 2);
    }
}
