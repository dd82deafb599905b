//! In-memory desktop used by tests and the demo binary.
//!
//! Holds a list of windows, tracks focus, and records every keystroke and
//! terminal launch instead of touching the OS.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{RecallError, Result};
use crate::host::{KeyboardInput, WindowSystem};
use crate::types::{AppName, Rect, WindowId, WindowInfo, WindowTitle};

/// A window entry in a desktop snapshot file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatedWindow {
    #[serde(flatten)]
    pub info: WindowInfo,
    /// Shell working directory for terminal windows.
    #[serde(default)]
    pub cwd: Option<PathBuf>,
}

/// Serializable description of a desktop, loaded from TOML.
///
/// ```toml
/// active = 1
///
/// [[windows]]
/// id = 1
/// app = "kitty"
/// title = "me@box: ~/src"
/// cwd = "/home/me/src"
/// rect = { x = 0.0, y = 0.0, width = 800.0, height = 600.0 }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DesktopSnapshot {
    #[serde(default)]
    pub active: Option<WindowId>,
    #[serde(default)]
    pub windows: Vec<SimulatedWindow>,
}

impl DesktopSnapshot {
    /// Load a snapshot from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let snapshot: DesktopSnapshot = toml::from_str(&content)?;
        info!(
            path = %path.display(),
            windows = snapshot.windows.len(),
            "Desktop snapshot loaded"
        );
        Ok(snapshot)
    }
}

/// Input injected into the simulated desktop, tagged with the window that
/// had focus at the time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Text { window: Option<WindowId>, text: String },
    Key { window: Option<WindowId>, key: String },
}

/// Window system and keyboard backed by plain vectors.
#[derive(Debug, Clone, Default)]
pub struct SimulatedDesktop {
    windows: Vec<WindowInfo>,
    cwds: HashMap<WindowId, PathBuf>,
    active: Option<WindowId>,
    input: Vec<InputEvent>,
    launches: Vec<(String, PathBuf)>,
    /// Highest handle ever seen. Handles are never reused.
    last_id: u64,
}

impl SimulatedDesktop {
    /// Create an empty desktop with no windows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a desktop from a snapshot.
    pub fn from_snapshot(snapshot: DesktopSnapshot) -> Self {
        let mut desktop = Self::new();
        for window in snapshot.windows {
            if let Some(cwd) = window.cwd {
                desktop.cwds.insert(window.info.id, cwd);
            }
            desktop.last_id = desktop.last_id.max(window.info.id.0);
            desktop.windows.push(window.info);
        }
        desktop.active = snapshot
            .active
            .filter(|id| desktop.windows.iter().any(|w| w.id == *id));
        desktop
    }

    /// Add a window. The first window added receives focus.
    pub fn open(&mut self, window: WindowInfo) {
        if self.active.is_none() {
            self.active = Some(window.id);
        }
        self.last_id = self.last_id.max(window.id.0);
        self.windows.push(window);
    }

    /// Add a terminal window whose shell runs in `cwd`.
    pub fn open_terminal(&mut self, window: WindowInfo, cwd: impl Into<PathBuf>) {
        self.cwds.insert(window.id, cwd.into());
        self.open(window);
    }

    /// Remove a window. Returns `true` if it existed.
    pub fn close(&mut self, id: WindowId) -> bool {
        let before = self.windows.len();
        self.windows.retain(|w| w.id != id);
        self.cwds.remove(&id);
        if self.active == Some(id) {
            self.active = None;
        }
        before != self.windows.len()
    }

    /// Change the title of an existing window.
    pub fn retitle(&mut self, id: WindowId, title: &str) {
        if let Some(window) = self.windows.iter_mut().find(|w| w.id == id) {
            window.title = WindowTitle::new(title);
        }
    }

    /// Change the shell working directory of a terminal window.
    pub fn set_cwd(&mut self, id: WindowId, cwd: impl Into<PathBuf>) {
        self.cwds.insert(id, cwd.into());
    }

    /// Give focus to a window without going through `WindowSystem::focus`.
    pub fn set_active(&mut self, id: WindowId) -> bool {
        if self.windows.iter().any(|w| w.id == id) {
            self.active = Some(id);
            true
        } else {
            false
        }
    }

    pub fn active_id(&self) -> Option<WindowId> {
        self.active
    }

    /// Everything typed or pressed so far, oldest first.
    pub fn input(&self) -> &[InputEvent] {
        &self.input
    }

    /// Terminal launches as `(command, working_dir)` pairs.
    pub fn launches(&self) -> &[(String, PathBuf)] {
        &self.launches
    }

    fn next_id(&mut self) -> WindowId {
        self.last_id += 1;
        WindowId(self.last_id)
    }
}

impl WindowSystem for SimulatedDesktop {
    fn active_window(&self) -> Option<WindowInfo> {
        self.active.and_then(|id| self.find(id))
    }

    fn windows(&self) -> Vec<WindowInfo> {
        self.windows.clone()
    }

    fn focus(&mut self, id: WindowId) -> Result<()> {
        if self.set_active(id) {
            debug!(window = %id, "Simulated focus");
            Ok(())
        } else {
            Err(RecallError::Window(format!("window {} does not exist", id)))
        }
    }

    fn launch_terminal(&mut self, app: &AppName, command: &str, working_dir: &Path) -> Result<()> {
        let id = self.next_id();
        let title = format!("user@simulated: {}", working_dir.display());
        self.launches
            .push((command.to_string(), working_dir.to_path_buf()));
        self.cwds.insert(id, working_dir.to_path_buf());
        self.windows.push(WindowInfo {
            id,
            app: app.clone(),
            title: WindowTitle::new(title),
            rect: Rect::new(0.0, 0.0, 800.0, 600.0),
        });
        info!(window = %id, command, dir = %working_dir.display(), "Simulated terminal launch");
        Ok(())
    }

    fn working_dir(&self, window: &WindowInfo) -> Option<PathBuf> {
        self.cwds.get(&window.id).cloned()
    }
}

impl KeyboardInput for SimulatedDesktop {
    fn insert(&mut self, text: &str) -> Result<()> {
        self.input.push(InputEvent::Text {
            window: self.active,
            text: text.to_string(),
        });
        Ok(())
    }

    fn key(&mut self, key: &str) -> Result<()> {
        if key.trim().is_empty() {
            return Err(RecallError::Input("empty key name".to_string()));
        }
        self.input.push(InputEvent::Key {
            window: self.active,
            key: key.to_string(),
        });
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
