//! Static mirror tables for spider.jar and their validation.
//!
//! Tables are plain configuration: a domestic list (mirrors reachable from
//! mainland networks), an international list (origin hosts), and a proxy list
//! (GitHub reverse proxies). A malformed table is a startup error.

mod order;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::checksum::is_sha256_hex;

pub use order::build_candidates;

/// One configured mirror URL, optionally pinned to a content checksum.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MirrorCandidate {
    pub url: String,
    /// Expected SHA-256 (hex) of the body; a mismatch rejects the mirror.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

impl MirrorCandidate {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            sha256: None,
        }
    }

    pub fn with_sha256(mut self, digest: impl Into<String>) -> Self {
        self.sha256 = Some(digest.into());
        self
    }

    /// True if the mirror is GitHub itself or a proxy in front of it.
    pub fn is_github_hosted(&self) -> bool {
        self.url.contains("github")
    }
}

/// The three mirror lists the candidate builder draws from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorTables {
    #[serde(default)]
    pub domestic: Vec<MirrorCandidate>,
    #[serde(default)]
    pub international: Vec<MirrorCandidate>,
    #[serde(default)]
    pub proxy: Vec<MirrorCandidate>,
}

const UPSTREAM: &str = "https://raw.githubusercontent.com/FongMi/CatVodSpider/main/jar/custom_spider.jar";

fn proxied(prefix: &str) -> MirrorCandidate {
    MirrorCandidate::new(format!("{prefix}{UPSTREAM}"))
}

impl Default for MirrorTables {
    fn default() -> Self {
        Self {
            domestic: vec![
                MirrorCandidate::new(
                    "https://agit.ai/Yoursmile7/TVBox/raw/branch/master/jar/custom_spider.jar",
                ),
                proxied("https://ghproxy.net/"),
                proxied("https://mirror.ghproxy.com/"),
                MirrorCandidate::new(
                    "https://raw.gitmirror.com/FongMi/CatVodSpider/main/jar/custom_spider.jar",
                ),
                MirrorCandidate::new("https://gitcode.net/qq_26898231/TVBox/-/raw/main/JAR/XC.jar"),
            ],
            international: vec![
                MirrorCandidate::new(UPSTREAM),
                MirrorCandidate::new(
                    "https://cdn.jsdelivr.net/gh/FongMi/CatVodSpider@main/jar/custom_spider.jar",
                ),
                MirrorCandidate::new(
                    "https://raw.gitmirror.com/FongMi/CatVodSpider/main/jar/custom_spider.jar",
                ),
            ],
            proxy: vec![
                proxied("https://gh-proxy.com/"),
                proxied("https://ghps.cc/"),
                proxied("https://ghproxy.cc/"),
                proxied("https://gh.api.99988866.xyz/"),
            ],
        }
    }
}

impl MirrorTables {
    /// Every candidate in table order (domestic, international, proxy), duplicates included.
    pub fn all(&self) -> impl Iterator<Item = &MirrorCandidate> {
        self.domestic
            .iter()
            .chain(self.international.iter())
            .chain(self.proxy.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.all().next().is_none()
    }

    /// Reject tables that could never yield a usable candidate or that contain
    /// malformed entries.
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            bail!("mirror tables are empty");
        }
        for cand in self.all() {
            validate_candidate(cand)?;
        }
        Ok(())
    }
}

fn validate_candidate(cand: &MirrorCandidate) -> Result<()> {
    let parsed =
        url::Url::parse(&cand.url).with_context(|| format!("invalid mirror URL: {}", cand.url))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => bail!("mirror URL must be http(s), got {other}: {}", cand.url),
    }
    if parsed.host_str().is_none() {
        bail!("mirror URL missing host: {}", cand.url);
    }
    if let Some(digest) = &cand.sha256 {
        if !is_sha256_hex(digest) {
            bail!("mirror {} has malformed sha256 annotation {digest:?}", cand.url);
        }
    }
    Ok(())
}
