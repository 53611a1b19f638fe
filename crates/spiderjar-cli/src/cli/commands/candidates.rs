//! `spiderjar candidates` – show classification and mirror order.

use anyhow::Result;
use spiderjar_core::config::SpiderConfig;
use spiderjar_core::environment::{Classification, EnvSignals};
use spiderjar_core::SpiderJarResolver;

pub(crate) fn print_classification(c: &Classification) {
    println!(
        "region: {} (timezone={} language={} country={})",
        c.region.as_str(),
        c.timezone_match,
        c.language_match,
        c.country_match
    );
}

pub fn run_candidates(cfg: &SpiderConfig, signals: &EnvSignals) -> Result<()> {
    let resolver = SpiderJarResolver::from_config(cfg)?;
    let (classification, candidates) = resolver.preview(signals);
    print_classification(&classification);
    println!("{:>3}  {}", "#", "URL");
    for (i, c) in candidates.iter().enumerate() {
        let pin = if c.sha256.is_some() { "  [pinned]" } else { "" };
        println!("{:>3}  {}{}", i + 1, c.url, pin);
    }
    Ok(())
}
