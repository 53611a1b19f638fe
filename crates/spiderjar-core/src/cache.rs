//! Single-slot resolution cache with separate success and failure TTLs.
//!
//! Only the latest result is kept. Successes live for hours; fallback results
//! expire after minutes so a recovering mirror is picked up soon.

use std::time::{Duration, SystemTime};

use crate::clock::elapsed_since;
use crate::config::CacheConfig;
use crate::result::ResolutionResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    pub success: Duration,
    pub failure: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            success: Duration::from_secs(4 * 60 * 60),
            failure: Duration::from_secs(10 * 60),
        }
    }
}

impl From<&CacheConfig> for CacheTtls {
    fn from(cfg: &CacheConfig) -> Self {
        Self {
            success: Duration::from_secs(cfg.success_ttl_secs),
            failure: Duration::from_secs(cfg.failure_ttl_secs),
        }
    }
}

#[derive(Debug, Default)]
pub struct ResolutionCache {
    slot: Option<ResolutionResult>,
    ttls: CacheTtls,
}

impl ResolutionCache {
    pub fn new(ttls: CacheTtls) -> Self {
        Self { slot: None, ttls }
    }

    pub fn ttl_for(&self, result: &ResolutionResult) -> Duration {
        if result.success {
            self.ttls.success
        } else {
            self.ttls.failure
        }
    }

    pub fn is_valid(&self, result: &ResolutionResult, now: SystemTime) -> bool {
        elapsed_since(now, result.created_at) < self.ttl_for(result)
    }

    /// The stored result, flagged as cached, if it is still within its TTL.
    pub fn get(&self, now: SystemTime) -> Option<ResolutionResult> {
        let stored = self.slot.as_ref()?;
        if !self.is_valid(stored, now) {
            return None;
        }
        let mut hit = stored.clone();
        hit.cached = true;
        Some(hit)
    }

    /// Replace the slot. The stored copy is marked not-cached; `get` sets the flag.
    pub fn put(&mut self, mut result: ResolutionResult) {
        result.cached = false;
        self.slot = Some(result);
    }

    /// The stored result regardless of TTL.
    pub fn peek(&self) -> Option<&ResolutionResult> {
        self.slot.as_ref()
    }

    /// Time left before the stored result expires (zero if expired or empty).
    pub fn remaining(&self, now: SystemTime) -> Duration {
        match &self.slot {
            Some(r) => self
                .ttl_for(r)
                .saturating_sub(elapsed_since(now, r.created_at)),
            None => Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use crate::result::JarOrigin;
    use std::sync::Arc;

    fn result(success: bool, at: SystemTime) -> ResolutionResult {
        ResolutionResult {
            bytes: Arc::from(vec![b'P', b'K']),
            sha256: "x".into(),
            origin: if success {
                JarOrigin::Mirror("https://m/".into())
            } else {
                JarOrigin::Fallback
            },
            success,
            cached: false,
            created_at: at,
            size: 2,
            tried: 1,
        }
    }

    #[test]
    fn empty_cache_misses() {
        let clock = ManualClock::at_epoch();
        assert!(ResolutionCache::default().get(clock.now()).is_none());
    }

    #[test]
    fn success_lives_for_success_ttl() {
        let clock = ManualClock::at_epoch();
        let mut cache = ResolutionCache::new(CacheTtls::default());
        cache.put(result(true, clock.now()));

        clock.advance(Duration::from_secs(4 * 60 * 60 - 1));
        let hit = cache.get(clock.now()).unwrap();
        assert!(hit.cached);
        assert!(!cache.peek().unwrap().cached);

        clock.advance(Duration::from_secs(1));
        assert!(cache.get(clock.now()).is_none());
    }

    #[test]
    fn failure_expires_after_failure_ttl() {
        let clock = ManualClock::at_epoch();
        let mut cache = ResolutionCache::new(CacheTtls::default());
        cache.put(result(false, clock.now()));
        clock.advance(Duration::from_secs(9 * 60));
        assert!(cache.get(clock.now()).is_some());
        clock.advance(Duration::from_secs(60));
        assert!(cache.get(clock.now()).is_none());
        assert!(cache.peek().is_some());
    }

    #[test]
    fn put_clears_cached_flag() {
        let clock = ManualClock::at_epoch();
        let mut cache = ResolutionCache::default();
        let mut r = result(true, clock.now());
        r.cached = true;
        cache.put(r);
        assert!(!cache.peek().unwrap().cached);
    }

    #[test]
    fn remaining_counts_down() {
        let clock = ManualClock::at_epoch();
        let mut cache = ResolutionCache::new(CacheTtls {
            success: Duration::from_secs(100),
            failure: Duration::from_secs(10),
        });
        cache.put(result(true, clock.now()));
        clock.advance(Duration::from_secs(40));
        assert_eq!(cache.remaining(clock.now()), Duration::from_secs(60));
    }
}
