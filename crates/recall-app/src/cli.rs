//! CLI argument definitions for the recall binary.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use recall_core::config::{home_dir, RecallConfig};

/// Recall: name windows by voice, then focus or dictate into them by name.
#[derive(Parser, Debug)]
#[command(name = "recall", version, about, disable_help_subcommand = true)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Log level or filter directive (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Saved-windows JSON file. Overrides `general.storage_file`.
    #[arg(short = 's', long = "storage")]
    pub storage: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    /// Read utterances from stdin, one per line, and run them.
    Run {
        /// TOML desktop snapshot to start from.
        #[arg(short = 'd', long = "desktop")]
        desktop: Option<PathBuf>,

        /// Print outcomes as JSON lines.
        #[arg(long)]
        json: bool,
    },
    /// Print the saved windows.
    List {
        #[arg(long)]
        json: bool,
    },
    /// Print the help panel.
    Help,
}

impl CliArgs {
    /// Subcommand to run; `run` when none is given.
    pub fn command(&self) -> CliCommand {
        self.command.clone().unwrap_or(CliCommand::Run {
            desktop: None,
            json: false,
        })
    }

    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > RECALL_CONFIG env var > ~/.recall/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("RECALL_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the log filter.
    ///
    /// Priority: --log-level flag > RECALL_LOG env var > config file value.
    pub fn resolve_log_level(&self, config: &RecallConfig) -> String {
        pick_log_level(
            self.log_level.as_deref(),
            std::env::var("RECALL_LOG").ok().as_deref(),
            &config.general.log_level,
        )
    }

    /// Resolve the saved-windows file. `None` keeps the registry in memory.
    pub fn resolve_storage(&self, config: &RecallConfig) -> Option<PathBuf> {
        self.storage
            .clone()
            .or_else(|| config.general.storage_path())
    }
}

fn pick_log_level(flag: Option<&str>, env: Option<&str>, config: &str) -> String {
    flag.or(env)
        .filter(|l| !l.trim().is_empty())
        .unwrap_or(config)
        .to_string()
}

/// Default config file path.
fn default_config_path() -> PathBuf {
    match home_dir() {
        Some(home) => home.join(".recall").join("config.toml"),
        None => PathBuf::from("config.toml"),
    }
}
