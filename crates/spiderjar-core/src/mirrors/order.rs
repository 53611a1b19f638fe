//! Candidate ordering: region preference, de-duplication, blacklist filter.

use std::collections::HashSet;

use super::{MirrorCandidate, MirrorTables};
use crate::blacklist::FailureBlacklist;
use crate::environment::Region;

/// Ordered, duplicate-free candidates for one resolution attempt.
///
/// Domestic requests try domestic mirrors, then origin hosts, then proxies.
/// International requests try origin hosts, then proxies, then domestic
/// mirrors. Blacklisted URLs are dropped unless that would leave nothing, in
/// which case the blacklist is ignored for this attempt.
pub fn build_candidates(
    region: Region,
    tables: &MirrorTables,
    blacklist: &FailureBlacklist,
) -> Vec<MirrorCandidate> {
    let groups: [&[MirrorCandidate]; 3] = match region {
        Region::Domestic => [&tables.domestic, &tables.international, &tables.proxy],
        Region::International => [&tables.international, &tables.proxy, &tables.domestic],
    };

    let mut seen: HashSet<&str> = HashSet::new();
    let mut ordered: Vec<MirrorCandidate> = Vec::new();
    for cand in groups.iter().flat_map(|g| g.iter()) {
        if seen.insert(cand.url.as_str()) {
            ordered.push(cand.clone());
        }
    }

    let filtered: Vec<MirrorCandidate> = ordered
        .iter()
        .filter(|c| !blacklist.contains(&c.url))
        .cloned()
        .collect();

    if filtered.is_empty() && !ordered.is_empty() {
        tracing::debug!(
            candidates = ordered.len(),
            "every mirror is blacklisted, ignoring blacklist for this attempt"
        );
        return ordered;
    }
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use std::time::Duration;

    fn c(url: &str) -> MirrorCandidate {
        MirrorCandidate::new(url)
    }

    fn tables() -> MirrorTables {
        MirrorTables {
            domestic: vec![c("https://d1/"), c("https://d2/")],
            international: vec![c("https://i1/"), c("https://d2/")],
            proxy: vec![c("https://p1/")],
        }
    }

    fn urls(v: &[MirrorCandidate]) -> Vec<&str> {
        v.iter().map(|c| c.url.as_str()).collect()
    }

    fn empty_blacklist() -> (ManualClock, FailureBlacklist) {
        let clock = ManualClock::at_epoch();
        let bl = FailureBlacklist::new(Duration::from_secs(7200), clock.now());
        (clock, bl)
    }

    #[test]
    fn domestic_order_and_dedup() {
        let (_clock, bl) = empty_blacklist();
        let out = build_candidates(Region::Domestic, &tables(), &bl);
        assert_eq!(urls(&out), ["https://d1/", "https://d2/", "https://i1/", "https://p1/"]);
    }

    #[test]
    fn international_order_and_dedup() {
        let (_clock, bl) = empty_blacklist();
        let out = build_candidates(Region::International, &tables(), &bl);
        assert_eq!(urls(&out), ["https://i1/", "https://d2/", "https://p1/", "https://d1/"]);
    }

    #[test]
    fn blacklisted_mirrors_are_skipped() {
        let (clock, mut bl) = empty_blacklist();
        bl.record_failure("https://d1/", clock.now());
        let out = build_candidates(Region::Domestic, &tables(), &bl);
        assert_eq!(urls(&out), ["https://d2/", "https://i1/", "https://p1/"]);
    }

    #[test]
    fn fully_blacklisted_list_is_not_starved() {
        let (clock, mut bl) = empty_blacklist();
        for u in ["https://d1/", "https://d2/", "https://i1/", "https://p1/"] {
            bl.record_failure(u, clock.now());
        }
        let out = build_candidates(Region::Domestic, &tables(), &bl);
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn deterministic() {
        let (_clock, bl) = empty_blacklist();
        let a = build_candidates(Region::International, &tables(), &bl);
        let b = build_candidates(Region::International, &tables(), &bl);
        assert_eq!(a, b);
    }
}
