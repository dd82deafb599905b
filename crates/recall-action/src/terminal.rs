//! Terminal working-directory detection and stale-handle re-matching.

use std::path::PathBuf;
use std::sync::OnceLock;

use recall_core::config::expand_home;
use recall_core::host::WindowSystem;
use recall_core::types::WindowInfo;
use recall_registry::WindowEntry;
use regex::Regex;

/// Parse a shell prompt title like `user@host: ~/src` or `user@host:/srv`.
///
/// Returns the path only if it exists as a directory.
pub fn path_from_title(title: &str) -> Option<PathBuf> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"@[^:]*:\s*(.+)$").expect("Invalid title path regex"));

    let caps = re.captures(title)?;
    let raw = caps.get(1)?.as_str().trim();
    let path = expand_home(raw);
    path.is_dir().then_some(path)
}

/// Working directory of a terminal window: the title first, since it is the
/// most reliable per-window signal, then whatever the host can report.
pub fn detect_path<W: WindowSystem + ?Sized>(host: &W, window: &WindowInfo) -> Option<PathBuf> {
    path_from_title(window.title.as_str()).or_else(|| {
        host.working_dir(window)
            .filter(|p| p.is_dir())
    })
}

/// Find a visible window that is probably the one `entry` was saved from:
/// same application, and either the saved path appears in its title or its
/// title starts with the saved title.
pub fn rematch(windows: &[WindowInfo], entry: &WindowEntry) -> Option<WindowInfo> {
    let saved_path = entry
        .path
        .as_ref()
        .map(|p| p.to_string_lossy().into_owned());
    let saved_title = entry.title.as_str();

    windows
        .iter()
        .filter(|w| w.app == entry.app && w.rect.is_visible())
        .find(|w| {
            let title = w.title.as_str();
            saved_path.as_deref().is_some_and(|p| title.contains(p))
                || (!saved_title.is_empty() && title.starts_with(saved_title))
        })
        .cloned()
}
