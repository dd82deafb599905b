//! Two-step command state.
//!
//! "recall alias edgar" (and rename/combine) names the target first, then
//! waits for the next utterance:
//! - Idle -> Awaiting (start a two-step command)
//! - Awaiting -> Idle (second input received, cancelled, or prompt expired)
//! - Awaiting -> Awaiting (a new start replaces the old one)

use std::fmt;

use tracing::debug;

/// Which two-step command is waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PendingMode {
    Alias,
    Rename,
    Combine,
}

impl fmt::Display for PendingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PendingMode::Alias => write!(f, "alias"),
            PendingMode::Rename => write!(f, "rename"),
            PendingMode::Combine => write!(f, "combine"),
        }
    }
}

impl PendingMode {
    /// Prompt title and subtitle shown while waiting.
    pub fn prompt(&self, label: &str) -> (String, String) {
        match self {
            PendingMode::Alias => (
                format!("Add alias for \"{}\"", label),
                "Say the alias...".to_string(),
            ),
            PendingMode::Rename => (
                format!("Rename \"{}\"", label),
                "Say the new name...".to_string(),
            ),
            PendingMode::Combine => (
                format!("Combine with \"{}\"", label),
                "Say the name to merge as an alias...".to_string(),
            ),
        }
    }
}

/// The first half of a two-step command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCommand {
    pub mode: PendingMode,
    pub label: String,
}

/// Holds at most one pending command.
#[derive(Debug, Clone, Default)]
pub struct PendingState {
    current: Option<PendingCommand>,
}

impl PendingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&PendingCommand> {
        self.current.as_ref()
    }

    /// Start waiting for the second input, replacing anything pending.
    pub fn begin(&mut self, mode: PendingMode, label: impl Into<String>) {
        let label = label.into();
        if let Some(previous) = &self.current {
            debug!(previous = %previous.mode, "Replacing pending command");
        }
        debug!(mode = %mode, label = %label, "Waiting for second input");
        self.current = Some(PendingCommand { mode, label });
    }

    /// Take the pending command, returning to idle.
    pub fn take(&mut self) -> Option<PendingCommand> {
        self.current.take()
    }

    /// Drop any pending command. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        let cancelled = self.current.take();
        if let Some(p) = &cancelled {
            debug!(mode = %p.mode, label = %p.label, "Pending command cancelled");
        }
        cancelled.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_idle() {
        let state = PendingState::new();
        assert!(!state.is_pending());
        assert!(state.current().is_none());
    }

    #[test]
    fn test_begin_then_take() {
        let mut state = PendingState::new();
        state.begin(PendingMode::Alias, "edgar");
        assert!(state.is_pending());

        let taken = state.take().unwrap();
        assert_eq!(taken.mode, PendingMode::Alias);
        assert_eq!(taken.label, "edgar");
        assert!(!state.is_pending());
        assert!(state.take().is_none());
    }

    #[test]
    fn test_begin_replaces() {
        let mut state = PendingState::new();
        state.begin(PendingMode::Alias, "edgar");
        state.begin(PendingMode::Combine, "velma");
        let current = state.current().unwrap();
        assert_eq!(current.mode, PendingMode::Combine);
        assert_eq!(current.label, "velma");
    }

    #[test]
    fn test_cancel() {
        let mut state = PendingState::new();
        assert!(!state.cancel());
        state.begin(PendingMode::Rename, "edgar");
        assert!(state.cancel());
        assert!(!state.is_pending());
    }

    #[test]
    fn test_prompt_text() {
        let (title, subtitle) = PendingMode::Combine.prompt("velma");
        assert_eq!(title, "Combine with \"velma\"");
        assert_eq!(subtitle, "Say the name to merge as an alias...");
        assert_eq!(PendingMode::Rename.to_string(), "rename");
    }
}
