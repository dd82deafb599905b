use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{RecallError, Result};

/// Top-level configuration for window recall.
///
/// Loaded from `~/.recall/config.toml` by default. Every section falls back
/// to its defaults when missing from the file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecallConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub grammar: GrammarConfig,
    #[serde(default)]
    pub overlay: OverlayConfig,
    #[serde(default)]
    pub dictation: DictationConfig,
    #[serde(default)]
    pub terminal: TerminalConfig,
}

impl RecallConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: RecallConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| RecallError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// JSON file the registry is persisted to. Empty keeps the registry in
    /// memory for the lifetime of the process.
    pub storage_file: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            storage_file: String::new(),
        }
    }
}

impl GeneralConfig {
    /// Resolved storage path, with `~` expanded. `None` when persistence is off.
    pub fn storage_path(&self) -> Option<PathBuf> {
        if self.storage_file.trim().is_empty() {
            None
        } else {
            Some(expand_home(&self.storage_file))
        }
    }
}

/// Phrase grammar settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GrammarConfig {
    /// Words that end a dictation and press Enter afterwards.
    pub enders: Vec<String>,
    /// Shortest single word of a multi-word label that is accepted on its own.
    pub min_term_length: usize,
    /// Words that can never be used as labels.
    pub forbidden_names: Vec<String>,
}

impl Default for GrammarConfig {
    fn default() -> Self {
        Self {
            enders: vec!["bravely".to_string()],
            min_term_length: 3,
            forbidden_names: [
                "recall", "assign", "save", "list", "help", "close", "forget", "all",
                "restore", "alias", "rename", "combine", "promote",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Overlay display durations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// How long window labels stay on screen.
    pub labels_secs: u64,
    /// How long the help panel stays on screen.
    pub help_secs: u64,
    /// How long a two-step prompt waits for its second input.
    pub prompt_secs: u64,
    /// How long flash notifications stay on screen.
    pub flash_millis: u64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            labels_secs: 5,
            help_secs: 30,
            prompt_secs: 15,
            flash_millis: 2500,
        }
    }
}

/// Dictation routing timings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DictationConfig {
    /// Maximum time to wait for a focus change to take effect.
    pub focus_timeout_millis: u64,
    /// Poll interval while waiting for focus.
    pub focus_poll_millis: u64,
    /// Pause between inserting text and pressing a trailing key.
    pub key_delay_millis: u64,
}

impl Default for DictationConfig {
    fn default() -> Self {
        Self {
            focus_timeout_millis: 1000,
            focus_poll_millis: 100,
            key_delay_millis: 50,
        }
    }
}

/// Terminal detection and relaunch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// Application names treated as terminal emulators.
    pub apps: Vec<String>,
    /// Program launched by `recall restore`.
    pub launch_command: String,
    /// Number of polls for the relaunched window to appear.
    pub launch_poll_attempts: u32,
    /// Interval between polls.
    pub launch_poll_millis: u64,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            apps: [
                "Gnome-terminal",
                "Mate-terminal",
                "kitty",
                "Alacritty",
                "foot",
                "xfce4-terminal",
                "Terminator",
                "Tilix",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            launch_command: "gnome-terminal".to_string(),
            launch_poll_attempts: 20,
            launch_poll_millis: 100,
        }
    }
}

impl TerminalConfig {
    pub fn is_terminal(&self, app: &str) -> bool {
        self.apps.iter().any(|a| a == app)
    }
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = home_dir() {
            return home.join(rest);
        }
    } else if path == "~" {
        if let Some(home) = home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Home directory from `HOME` (or `USERPROFILE` on Windows).
pub fn home_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    let var = "USERPROFILE";
    #[cfg(not(target_os = "windows"))]
    let var = "HOME";
    std::env::var(var).ok().map(PathBuf::from)
}

// =============================================================================
// Tests
// =============================================================================
