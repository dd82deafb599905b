use std::path::PathBuf;

use recall_core::types::{AppName, Timestamp, WindowId, WindowInfo, WindowTitle};

/// A saved window and every label that points at it.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowEntry {
    /// Canonical label. Unique across the registry.
    pub primary: String,
    /// Secondary labels in the order they were added.
    pub aliases: Vec<String>,
    /// Host handle of the window.
    pub window: WindowId,
    /// Application that owns the window, used to re-match stale handles.
    pub app: AppName,
    /// Title when the window was last seen.
    pub title: WindowTitle,
    /// Shell working directory, for terminal windows.
    pub path: Option<PathBuf>,
    pub created_at: Timestamp,
}

impl WindowEntry {
    /// Create an entry for `window` with no aliases.
    pub fn new(primary: String, window: &WindowInfo, path: Option<PathBuf>) -> Self {
        Self {
            primary,
            aliases: Vec::new(),
            window: window.id,
            app: window.app.clone(),
            title: window.title.clone(),
            path,
            created_at: Timestamp::now(),
        }
    }

    /// Primary label followed by aliases.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Whether `label` (already normalised) names this entry.
    pub fn answers_to(&self, label: &str) -> bool {
        self.labels().any(|l| l == label)
    }

    /// "primary / alias / alias" as shown in the help panel.
    pub fn display_names(&self) -> String {
        self.labels().collect::<Vec<_>>().join(" / ")
    }

    pub(crate) fn push_alias(&mut self, alias: &str) -> bool {
        if alias == self.primary || self.aliases.iter().any(|a| a == alias) {
            false
        } else {
            self.aliases.push(alias.to_string());
            true
        }
    }

    pub(crate) fn drop_alias(&mut self, alias: &str) {
        self.aliases.retain(|a| a != alias);
    }
}
