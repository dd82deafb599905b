//! Commands produced by the grammar and outcomes reported by the dispatcher.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A parsed recall command. Labels are primary labels as resolved by the
/// grammar, except where noted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Command {
    /// Save the focused window. `label` is a new, free-form label.
    SaveWindow { label: String },
    RecallWindow { label: String },
    RecallNumber { label: String, number: u8 },
    DictateToWindow { label: String, text: String },
    DictateToWindowAndEnter { label: String, text: String },
    ForgetWindow { label: String },
    ForgetAllWindows,
    ListSavedWindows,
    ShowRecallHelp,
    HideRecallOverlay,
    RecallAliasStart { label: String },
    RecallRenameStart { label: String },
    RecallCombineStart { label: String },
    /// Second half of a two-step command. `spoken` is whatever was said.
    RecallPendingFinish { spoken: String },
    AddRecallAlias { label: String, alias: String },
    RecallRename { label: String, new_label: String },
    RecallCombine { primary: String, secondary: String },
    /// `label` is the spoken alias, not yet resolved.
    RecallPromote { label: String },
    RestoreWindow { label: String },
}

impl Command {
    /// The host action name this command is bound to.
    pub fn action_name(&self) -> &'static str {
        match self {
            Command::SaveWindow { .. } => "save_window",
            Command::RecallWindow { .. } => "recall_window",
            Command::RecallNumber { .. } => "recall_number",
            Command::DictateToWindow { .. } => "dictate_to_window",
            Command::DictateToWindowAndEnter { .. } => "dictate_to_window_and_enter",
            Command::ForgetWindow { .. } => "forget_window",
            Command::ForgetAllWindows => "forget_all_windows",
            Command::ListSavedWindows => "list_saved_windows",
            Command::ShowRecallHelp => "show_recall_help",
            Command::HideRecallOverlay => "hide_recall_overlay",
            Command::RecallAliasStart { .. } => "recall_alias_start",
            Command::RecallRenameStart { .. } => "recall_rename_start",
            Command::RecallCombineStart { .. } => "recall_combine_start",
            Command::RecallPendingFinish { .. } => "recall_pending_finish",
            Command::AddRecallAlias { .. } => "add_recall_alias",
            Command::RecallRename { .. } => "recall_rename",
            Command::RecallCombine { .. } => "recall_combine",
            Command::RecallPromote { .. } => "recall_promote",
            Command::RestoreWindow { .. } => "restore_window",
        }
    }

    /// Whether running this command can change the registry.
    pub fn mutates_registry(&self) -> bool {
        matches!(
            self,
            Command::SaveWindow { .. }
                | Command::ForgetWindow { .. }
                | Command::ForgetAllWindows
                | Command::RecallPendingFinish { .. }
                | Command::AddRecallAlias { .. }
                | Command::RecallRename { .. }
                | Command::RecallCombine { .. }
                | Command::RecallPromote { .. }
        )
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.action_name())
    }
}

/// What happened when a command ran. Failures are also flashed on the
/// overlay; the outcome lets callers log or print them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub action: String,
    pub success: bool,
    pub message: Option<String>,
}

impl Outcome {
    pub fn ok(command: &Command) -> Self {
        Self {
            action: command.action_name().to_string(),
            success: true,
            message: None,
        }
    }

    pub fn ok_with(command: &Command, message: impl Into<String>) -> Self {
        Self {
            action: command.action_name().to_string(),
            success: true,
            message: Some(message.into()),
        }
    }

    pub fn failed(command: &Command, message: impl Into<String>) -> Self {
        Self {
            action: command.action_name().to_string(),
            success: false,
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_names() {
        let cmd = Command::SaveWindow {
            label: "edgar".to_string(),
        };
        assert_eq!(cmd.action_name(), "save_window");
        assert_eq!(cmd.to_string(), "save_window");
        assert_eq!(Command::ForgetAllWindows.action_name(), "forget_all_windows");
        assert_eq!(
            Command::DictateToWindowAndEnter {
                label: "a".into(),
                text: "b".into()
            }
            .action_name(),
            "dictate_to_window_and_enter"
        );
    }

    #[test]
    fn test_mutates_registry() {
        assert!(Command::ForgetAllWindows.mutates_registry());
        assert!(Command::RecallPromote { label: "x".into() }.mutates_registry());
        assert!(!Command::ListSavedWindows.mutates_registry());
        assert!(!Command::RecallWindow { label: "x".into() }.mutates_registry());
    }

    #[test]
    fn test_command_serializes_with_action_tag() {
        let cmd = Command::RecallNumber {
            label: "edgar".to_string(),
            number: 3,
        };
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["action"], "recall_number");
        assert_eq!(json["label"], "edgar");
        assert_eq!(json["number"], 3);
    }

    #[test]
    fn test_outcome_constructors() {
        let cmd = Command::ListSavedWindows;
        assert!(Outcome::ok(&cmd).success);
        let failed = Outcome::failed(&cmd, "nothing saved");
        assert!(!failed.success);
        assert_eq!(failed.message.as_deref(), Some("nothing saved"));
        assert_eq!(failed.action, "list_saved_windows");
    }
}
