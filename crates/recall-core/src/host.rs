//! Host integration seams.
//!
//! The recall system never touches the OS directly. The voice host supplies
//! window enumeration, focus, and keyboard injection through these traits;
//! `SimulatedDesktop` implements both for tests and the demo binary.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::types::{AppName, WindowId, WindowInfo};

/// Window enumeration and manipulation supplied by the host.
pub trait WindowSystem {
    /// The window that currently has input focus.
    fn active_window(&self) -> Option<WindowInfo>;

    /// All foreground application windows.
    fn windows(&self) -> Vec<WindowInfo>;

    /// Look up a window by handle.
    fn find(&self, id: WindowId) -> Option<WindowInfo> {
        self.windows().into_iter().find(|w| w.id == id)
    }

    /// Bring the window to the front and give it input focus.
    fn focus(&mut self, id: WindowId) -> Result<()>;

    /// Start a new terminal of `app` running `command` in `working_dir`.
    ///
    /// The new window is discovered afterwards by polling `windows()`.
    fn launch_terminal(&mut self, app: &AppName, command: &str, working_dir: &Path)
        -> Result<()>;

    /// Working directory of the shell inside a terminal window, when the
    /// host can determine it (e.g. from `/proc/<pid>/cwd`).
    fn working_dir(&self, _window: &WindowInfo) -> Option<PathBuf> {
        None
    }
}

/// Keyboard injection into the focused window.
pub trait KeyboardInput {
    /// Type `text` into the focused window.
    fn insert(&mut self, text: &str) -> Result<()>;

    /// Press and release a single named key (`"enter"`, `"3"`, ...).
    fn key(&mut self, key: &str) -> Result<()>;
}
