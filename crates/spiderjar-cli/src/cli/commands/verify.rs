//! `spiderjar verify <path>` – structural check and SHA-256 of a local jar.

use anyhow::{Context, Result};
use spiderjar_core::config::SpiderConfig;
use spiderjar_core::fetch::validate_jar;
use std::path::Path;

pub async fn run_verify(cfg: &SpiderConfig, path: &Path) -> Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let digest = validate_jar(&bytes, cfg.fetch.min_jar_bytes, None)
        .with_context(|| format!("{} is not a usable jar", path.display()))?;
    println!("{}  {}", digest, path.display());
    println!("ok: {} bytes, ZIP signature present", bytes.len());
    Ok(())
}
