//! Spider.jar resolution: cache check, ordered mirror walk, fallback.
//!
//! The resolver owns all mutable state (cache slot, failure blacklist, abort
//! token) so that a process can hold one instance behind an `Arc` and tests
//! can build isolated ones with a fake fetcher and a manual clock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use anyhow::Result;

use crate::blacklist::FailureBlacklist;
use crate::cache::{CacheTtls, ResolutionCache};
use crate::clock::{Clock, SystemClock};
use crate::config::SpiderConfig;
use crate::environment::{self, Classification, EnvSignals, Region};
use crate::fallback::fallback_result;
use crate::fetch::{CurlFetcher, FetchError, FetchSettings, JarFetcher, RemoteFetcher};
use crate::mirrors::{build_candidates, MirrorCandidate, MirrorTables};
use crate::result::{JarOrigin, ResolutionResult, ResolutionStatus};

/// Everything the resolver needs besides its collaborators.
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    pub fetch: FetchSettings,
    pub ttls: CacheTtls,
    pub blacklist_epoch: Duration,
    /// Signals used for any field a request does not supply.
    pub default_signals: EnvSignals,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            fetch: FetchSettings::default(),
            ttls: CacheTtls::default(),
            blacklist_epoch: Duration::from_secs(2 * 60 * 60),
            default_signals: EnvSignals::default(),
        }
    }
}

impl ResolverSettings {
    pub fn from_config(cfg: &SpiderConfig) -> Self {
        let mut default_signals = cfg.environment.clone();
        if default_signals.timezone.is_none() {
            default_signals.timezone = environment::local_timezone();
        }
        Self {
            fetch: FetchSettings::from_config(cfg),
            ttls: CacheTtls::from(&cfg.cache),
            blacklist_epoch: Duration::from_secs(cfg.cache.blacklist_epoch_secs),
            default_signals,
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct SpiderJarResolver {
    tables: MirrorTables,
    fetcher: RemoteFetcher,
    clock: Arc<dyn Clock>,
    default_signals: EnvSignals,
    cache: Mutex<ResolutionCache>,
    blacklist: Mutex<FailureBlacklist>,
    /// Serializes cache-miss resolutions so concurrent callers share one probe.
    flight: Mutex<()>,
    abort: AtomicBool,
}

impl SpiderJarResolver {
    pub fn new(
        settings: ResolverSettings,
        tables: MirrorTables,
        client: Arc<dyn JarFetcher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let now = clock.now();
        Self {
            tables,
            fetcher: RemoteFetcher::new(client, settings.fetch),
            default_signals: settings.default_signals,
            cache: Mutex::new(ResolutionCache::new(settings.ttls)),
            blacklist: Mutex::new(FailureBlacklist::new(settings.blacklist_epoch, now)),
            flight: Mutex::new(()),
            abort: AtomicBool::new(false),
            clock,
        }
    }

    /// Production wiring: curl client, system clock, validated config.
    pub fn from_config(cfg: &SpiderConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Self::new(
            ResolverSettings::from_config(cfg),
            cfg.mirror_tables(),
            Arc::new(CurlFetcher::from_config(&cfg.fetch)),
            Arc::new(SystemClock),
        ))
    }

    /// Resolve using only the configured/server-local signals.
    pub fn resolve(&self, force_refresh: bool) -> ResolutionResult {
        self.resolve_for(force_refresh, &EnvSignals::default())
    }

    /// Resolve with request-derived signals; missing ones fall back to the
    /// configured defaults. Never fails: the worst case is the embedded jar.
    pub fn resolve_for(&self, force_refresh: bool, signals: &EnvSignals) -> ResolutionResult {
        if !force_refresh {
            if let Some(hit) = self.cached() {
                return hit;
            }
        }

        let _flight = lock(&self.flight);
        // Another caller may have filled the slot while we waited.
        if !force_refresh {
            if let Some(hit) = self.cached() {
                return hit;
            }
        }

        let signals = signals.clone().or(&self.default_signals);
        let region = environment::classify(&signals);
        let candidates = self.candidates_for(region);
        tracing::debug!(
            region = region.as_str(),
            candidates = candidates.len(),
            force_refresh,
            "resolving spider.jar"
        );

        let result = self.walk(&candidates);
        lock(&self.cache).put(result.clone());
        result
    }

    fn cached(&self) -> Option<ResolutionResult> {
        let hit = lock(&self.cache).get(self.clock.now())?;
        tracing::debug!(source = %hit.origin, success = hit.success, "spider.jar cache hit");
        Some(hit)
    }

    /// Try candidates in order; first validated body wins.
    fn walk(&self, candidates: &[MirrorCandidate]) -> ResolutionResult {
        let mut tried = 0usize;
        for cand in candidates {
            if self.abort.load(Ordering::Relaxed) {
                break;
            }
            tried += 1;
            match self.fetcher.fetch(cand, &self.abort) {
                Ok(jar) => {
                    lock(&self.blacklist).record_success(&cand.url);
                    tracing::info!(
                        source = %cand.url,
                        size = jar.bytes.len(),
                        attempts = jar.attempts,
                        tried,
                        "spider.jar resolved"
                    );
                    let size = jar.bytes.len();
                    return ResolutionResult {
                        bytes: Arc::from(jar.bytes),
                        sha256: jar.sha256,
                        origin: JarOrigin::Mirror(cand.url.clone()),
                        success: true,
                        cached: false,
                        created_at: self.clock.now(),
                        size,
                        tried,
                    };
                }
                Err(FetchError::Cancelled) => {
                    tracing::debug!(source = %cand.url, "resolution cancelled");
                    break;
                }
                Err(e) => {
                    tracing::warn!(source = %cand.url, "mirror failed: {}", e);
                    lock(&self.blacklist).record_failure(&cand.url, self.clock.now());
                }
            }
        }
        tracing::warn!(tried, "no mirror produced a valid jar, serving embedded fallback");
        fallback_result(self.clock.now(), tried)
    }

    /// Byte-less view of the cache slot, whatever its age.
    pub fn status(&self) -> Option<ResolutionStatus> {
        lock(&self.cache).peek().map(ResolutionResult::status)
    }

    /// Time until the cached result expires.
    pub fn cache_remaining(&self) -> Duration {
        lock(&self.cache).remaining(self.clock.now())
    }

    /// Ordered candidates for `region` under the current blacklist. Also rolls
    /// the blacklist epoch if due.
    pub fn candidates_for(&self, region: Region) -> Vec<MirrorCandidate> {
        let mut bl = lock(&self.blacklist);
        bl.maybe_reset(self.clock.now());
        build_candidates(region, &self.tables, &bl)
    }

    /// Classification and ordering a request with `signals` would get.
    pub fn preview(&self, signals: &EnvSignals) -> (Classification, Vec<MirrorCandidate>) {
        let signals = signals.clone().or(&self.default_signals);
        let classification = environment::classify_detailed(&signals);
        let candidates = self.candidates_for(classification.region);
        (classification, candidates)
    }

    /// Currently blacklisted mirror URLs.
    pub fn blacklisted(&self) -> Vec<String> {
        let mut bl = lock(&self.blacklist);
        bl.maybe_reset(self.clock.now());
        bl.urls()
    }

    pub fn fetcher(&self) -> &RemoteFetcher {
        &self.fetcher
    }

    /// Stop in-flight backoff sleeps and skip remaining mirrors. Later calls
    /// resolve straight to the cache or the fallback.
    pub fn shutdown(&self) {
        self.abort.store(true, Ordering::Relaxed);
    }
}
