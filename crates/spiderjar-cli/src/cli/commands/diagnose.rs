//! `spiderjar diagnose` – probe all mirrors, then resolve and print hints.

use anyhow::{Context, Result};
use serde::Serialize;
use spiderjar_core::config::SpiderConfig;
use spiderjar_core::diagnostics::{self, ProbeReport};
use spiderjar_core::environment::{Classification, EnvSignals};
use spiderjar_core::{ResolutionStatus, SpiderJarResolver};
use std::sync::Arc;

use super::candidates::print_classification;

#[derive(Serialize)]
struct Diagnosis {
    classification: Classification,
    report: ProbeReport,
    status: ResolutionStatus,
    recommendations: Vec<String>,
}

fn print_report(report: &ProbeReport) {
    println!(
        "  {:<8}  {:>8}  {:>6}  {:>9}  {}",
        "Result", "Time(ms)", "HTTP", "Bytes", "URL"
    );
    for r in &report.results {
        let http = r.http_status.map(|c| c.to_string()).unwrap_or_else(|| "-".into());
        let size = r.size.map(|s| s.to_string()).unwrap_or_else(|| "-".into());
        println!(
            "  {:<8}  {:>8}  {:>6}  {:>9}  {}",
            r.outcome.as_str(),
            r.elapsed_ms,
            http,
            size,
            r.url
        );
    }
    let s = &report.summary;
    println!(
        "tested {}, succeeded {}, failed {}, average {} ms",
        s.tested, s.succeeded, s.failed, s.average_ms
    );
    if let Some(fastest) = &s.fastest {
        println!("fastest: {}", fastest);
    }
    if let Some(rec) = &s.recommended {
        println!("recommended: {}", rec);
    }
}

pub async fn run_diagnose(cfg: &SpiderConfig, signals: &EnvSignals, json: bool) -> Result<()> {
    let resolver = Arc::new(SpiderJarResolver::from_config(cfg)?);
    let signals = signals.clone();
    let diagnosis = tokio::task::spawn_blocking(move || {
        let (classification, candidates) = resolver.preview(&signals);
        let report = diagnostics::probe_all(resolver.fetcher(), &candidates);
        let status = resolver.resolve_for(false, &signals).status();
        let recommendations = diagnostics::recommendations(&status);
        Diagnosis {
            classification,
            report,
            status,
            recommendations,
        }
    })
    .await
    .context("diagnose task join")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&diagnosis)?);
        return Ok(());
    }

    print_classification(&diagnosis.classification);
    print_report(&diagnosis.report);
    println!(
        "resolved: {} ({} bytes, success={}, tried={})",
        diagnosis.status.origin, diagnosis.status.size, diagnosis.status.success, diagnosis.status.tried
    );
    for rec in &diagnosis.recommendations {
        println!("hint: {}", rec);
    }
    Ok(())
}
