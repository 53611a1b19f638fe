//! CLI for spider.jar resolution.

mod commands;

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use spiderjar_core::config::{self, SpiderConfig};
use spiderjar_core::environment::EnvSignals;
use std::path::{Path, PathBuf};

use commands::{
    run_candidates, run_completions, run_diagnose, run_fetch, run_serve, run_verify,
};

/// Top-level CLI for spiderjar.
#[derive(Debug, Parser)]
#[command(name = "spiderjar")]
#[command(about = "Resolve TVBox spider.jar from the best reachable mirror", long_about = None)]
pub struct Cli {
    /// Load configuration from this file instead of ~/.config/spiderjar/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

/// Overrides for the environment classifier.
#[derive(Debug, Clone, Default, Args)]
pub struct SignalArgs {
    /// IANA timezone, e.g. Asia/Shanghai.
    #[arg(long)]
    pub timezone: Option<String>,
    /// Accept-Language value, e.g. "zh-CN,zh;q=0.9".
    #[arg(long)]
    pub lang: Option<String>,
    /// Two-letter country code of the client IP.
    #[arg(long)]
    pub country: Option<String>,
}

impl SignalArgs {
    pub fn to_signals(&self) -> EnvSignals {
        EnvSignals {
            timezone: self.timezone.clone(),
            accept_language: self.lang.clone(),
            ip_country: self.country.clone(),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Resolve spider.jar once and write it to disk.
    Fetch {
        /// Ignore the cached result and probe mirrors again.
        #[arg(long)]
        refresh: bool,
        /// Where to write the jar.
        #[arg(long, short, default_value = "spider.jar", value_name = "PATH")]
        output: PathBuf,
    },

    /// Show the environment classification and mirror order.
    Candidates {
        #[command(flatten)]
        signals: SignalArgs,
    },

    /// Probe every mirror once and report reachability.
    Diagnose {
        #[command(flatten)]
        signals: SignalArgs,
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Check that a local file looks like a jar and print its SHA-256.
    Verify {
        /// Path to the jar.
        path: PathBuf,
    },

    /// Serve /spider.jar and /spider-status over HTTP.
    Serve {
        /// Listen address (overrides serve.bind from the config).
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },

    /// Print a shell completion script.
    Completions {
        shell: Shell,
    },
}

fn load_config(path: Option<&Path>) -> Result<SpiderConfig> {
    match path {
        Some(p) => config::load_from_path(p),
        None => config::load_or_init(),
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        if let CliCommand::Completions { shell } = cli.command {
            return run_completions(shell, &mut Cli::command());
        }

        let cfg = load_config(cli.config.as_deref())?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Fetch { refresh, output } => run_fetch(&cfg, refresh, &output).await?,
            CliCommand::Candidates { signals } => run_candidates(&cfg, &signals.to_signals())?,
            CliCommand::Diagnose { signals, json } => {
                run_diagnose(&cfg, &signals.to_signals(), json).await?
            }
            CliCommand::Verify { path } => run_verify(&cfg, &path).await?,
            CliCommand::Serve { bind } => run_serve(&cfg, bind.as_deref()).await?,
            CliCommand::Completions { .. } => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
