//! `spiderjar fetch` – resolve once and write the artifact.

use anyhow::{Context, Result};
use spiderjar_core::config::SpiderConfig;
use spiderjar_core::SpiderJarResolver;
use std::path::Path;
use std::sync::Arc;

pub async fn run_fetch(cfg: &SpiderConfig, refresh: bool, output: &Path) -> Result<()> {
    let resolver = Arc::new(SpiderJarResolver::from_config(cfg)?);
    let result = tokio::task::spawn_blocking(move || resolver.resolve(refresh))
        .await
        .context("resolve task join")?;

    std::fs::write(output, &result.bytes[..])
        .with_context(|| format!("write {}", output.display()))?;

    println!("source:  {}", result.origin);
    println!("size:    {} bytes", result.size);
    println!("sha256:  {}", result.sha256);
    println!("success: {}", result.success);
    println!("tried:   {}", result.tried);
    println!("wrote {}", output.display());
    if !result.success {
        eprintln!("warning: no mirror was reachable; wrote the embedded placeholder jar");
    }
    Ok(())
}
