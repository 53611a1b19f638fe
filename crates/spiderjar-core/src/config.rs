use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::environment::EnvSignals;
use crate::mirrors::MirrorTables;

/// HTTP fetch parameters for mirror GETs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Total deadline per attempt, in seconds.
    pub timeout_secs: u64,
    /// Connect deadline per attempt, in seconds.
    pub connect_timeout_secs: u64,
    /// Bodies smaller than this are not a plausible jar.
    pub min_jar_bytes: usize,
    /// Transfers are aborted past this size.
    pub max_jar_bytes: usize,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            connect_timeout_secs: 5,
            min_jar_bytes: 1024,
            max_jar_bytes: 32 * 1024 * 1024,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
        }
    }
}

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per mirror (including the first).
    pub max_attempts: u32,
    /// Linear backoff unit in seconds (e.g. 0.5 = 500ms, 1s, ...).
    pub backoff_secs: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            backoff_secs: 0.5,
        }
    }
}

/// Cache lifetimes and blacklist epoch, all in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub success_ttl_secs: u64,
    pub failure_ttl_secs: u64,
    pub blacklist_epoch_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            success_ttl_secs: 4 * 60 * 60,
            failure_ttl_secs: 10 * 60,
            blacklist_epoch_secs: 2 * 60 * 60,
        }
    }
}

/// HTTP surface settings for `spiderjar serve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    pub bind: String,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3920".to_string(),
        }
    }
}

/// Global configuration loaded from `~/.config/spiderjar/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpiderConfig {
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    #[serde(default)]
    pub cache: CacheConfig,
    /// Server-side classification signals used when a request carries none.
    #[serde(default)]
    pub environment: EnvSignals,
    /// Mirror tables; if missing, the built-in tables are used.
    #[serde(default)]
    pub mirrors: Option<MirrorTables>,
    #[serde(default)]
    pub serve: ServeConfig,
}

impl SpiderConfig {
    /// Configured mirror tables, or the built-in ones.
    pub fn mirror_tables(&self) -> MirrorTables {
        self.mirrors.clone().unwrap_or_default()
    }

    /// Reject configurations that would break resolution at runtime.
    pub fn validate(&self) -> Result<()> {
        if self.fetch.timeout_secs == 0 {
            bail!("fetch.timeout_secs must be > 0");
        }
        if self.fetch.min_jar_bytes == 0 || self.fetch.min_jar_bytes > self.fetch.max_jar_bytes {
            bail!(
                "fetch.min_jar_bytes ({}) must be in 1..=max_jar_bytes ({})",
                self.fetch.min_jar_bytes,
                self.fetch.max_jar_bytes
            );
        }
        if let Some(retry) = &self.retry {
            if retry.max_attempts == 0 {
                bail!("retry.max_attempts must be >= 1");
            }
            if !retry.backoff_secs.is_finite() || retry.backoff_secs < 0.0 {
                bail!("retry.backoff_secs must be a non-negative number");
            }
        }
        if self.cache.success_ttl_secs == 0 || self.cache.failure_ttl_secs == 0 {
            bail!("cache TTLs must be > 0");
        }
        if self.cache.blacklist_epoch_secs == 0 {
            bail!("cache.blacklist_epoch_secs must be > 0");
        }
        self.serve
            .bind
            .parse::<SocketAddr>()
            .with_context(|| format!("serve.bind is not a socket address: {}", self.serve.bind))?;
        self.mirror_tables().validate().context("mirror tables")?;
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("spiderjar")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load and validate configuration from an explicit path.
pub fn load_from_path(path: &Path) -> Result<SpiderConfig> {
    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: SpiderConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SpiderConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = SpiderConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}
