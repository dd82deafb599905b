//! Overlay view models.
//!
//! Plain data describing what the overlay should show. Building a view reads
//! the registry and the host's window list but never changes either.

use std::fmt;

use recall_core::types::WindowInfo;
use recall_registry::LabelRegistry;

/// Independent overlay layers. Each one is shown and expires on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OverlayLayer {
    Labels,
    Help,
    Prompt,
    Flash,
}

impl fmt::Display for OverlayLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlayLayer::Labels => write!(f, "labels"),
            OverlayLayer::Help => write!(f, "help"),
            OverlayLayer::Prompt => write!(f, "prompt"),
            OverlayLayer::Flash => write!(f, "flash"),
        }
    }
}

/// A name tag centred on a window.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelPill {
    pub text: String,
    pub center: (f32, f32),
}

/// Name tags for every saved window. Windows that cannot be found are listed
/// separately and drawn stacked at the top of the screen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelsView {
    pub placed: Vec<LabelPill>,
    pub missing: Vec<String>,
}

impl LabelsView {
    pub fn build(registry: &LabelRegistry, windows: &[WindowInfo]) -> Self {
        let mut view = Self::default();
        for entry in registry.entries() {
            match windows.iter().find(|w| w.id == entry.window) {
                Some(window) if window.rect.is_visible() => view.placed.push(LabelPill {
                    text: entry.primary.clone(),
                    center: window.rect.center(),
                }),
                Some(_) => {}
                None => view.missing.push(format!("{} (not found)", entry.primary)),
            }
        }
        view
    }

    pub fn is_empty(&self) -> bool {
        self.placed.is_empty() && self.missing.is_empty()
    }
}

/// One saved window in the help panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpRow {
    /// "primary / alias / alias"
    pub names: String,
    pub app: String,
    pub path: Option<String>,
    pub present: bool,
}

/// The full help panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpView {
    pub rows: Vec<HelpRow>,
    pub commands: Vec<(String, String)>,
}

const HELP_COMMANDS: [(&str, &str); 15] = [
    ("\"recall assign <name>\"", "save focused window"),
    ("\"<name>\"", "switch to window"),
    ("\"<name> <number>\"", "press number key"),
    ("\"<name> <dictation>\"", "dictate into window"),
    ("\"<name> <dictation> <ender>\"", "dictate + Enter"),
    ("\"recall restore <name>\"", "relaunch terminal"),
    ("\"recall alias <name> ...\"", "add alias"),
    ("\"recall combine <a> <b>\"", "merge b as alias of a"),
    ("\"recall rename <name> <new>\"", "change canonical name"),
    ("\"recall promote <alias>\"", "make alias the primary name"),
    ("\"recall list\"", "show labels on windows"),
    ("\"recall help\"", "this screen"),
    ("\"recall forget <name>\"", "remove"),
    ("\"recall forget all\"", "clear all"),
    ("\"recall close\"", "dismiss overlay"),
];

/// Command reference with `<ender>` replaced by the configured ender words.
pub fn command_reference(enders: &[String]) -> Vec<(String, String)> {
    let mut words: Vec<&str> = enders.iter().map(String::as_str).collect();
    words.sort_unstable();
    let ender = match words.as_slice() {
        [] => "<ender>".to_string(),
        [one] => one.to_string(),
        many => format!("({})", many.join(" | ")),
    };
    HELP_COMMANDS
        .iter()
        .map(|(cmd, desc)| (cmd.replace("<ender>", &ender), desc.to_string()))
        .collect()
}

impl HelpView {
    /// Rows for present windows come first, then missing ones.
    pub fn build(registry: &LabelRegistry, windows: &[WindowInfo], enders: &[String]) -> Self {
        let mut rows: Vec<HelpRow> = registry
            .entries()
            .map(|entry| HelpRow {
                names: entry.display_names(),
                app: entry.app.0.clone(),
                path: entry.path.as_ref().map(|p| p.display().to_string()),
                present: windows.iter().any(|w| w.id == entry.window),
            })
            .collect();
        rows.sort_by_key(|r| !r.present);
        Self {
            rows,
            commands: command_reference(enders),
        }
    }
}

/// Prompt shown while a two-step command waits for input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptView {
    pub title: String,
    pub subtitle: String,
}

/// Anything the overlay can display.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayView {
    Labels(LabelsView),
    Help(HelpView),
    Prompt(PromptView),
    Flash(String),
}

impl OverlayView {
    pub fn layer(&self) -> OverlayLayer {
        match self {
            OverlayView::Labels(_) => OverlayLayer::Labels,
            OverlayView::Help(_) => OverlayLayer::Help,
            OverlayView::Prompt(_) => OverlayLayer::Prompt,
            OverlayView::Flash(_) => OverlayLayer::Flash,
        }
    }
}

/// Plain-text rendering, used by terminal front-ends and logs.
impl fmt::Display for OverlayView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlayView::Labels(view) => {
                for pill in &view.placed {
                    writeln!(
                        f,
                        "[{}] at ({:.0}, {:.0})",
                        pill.text, pill.center.0, pill.center.1
                    )?;
                }
                for missing in &view.missing {
                    writeln!(f, "[{}]", missing)?;
                }
                Ok(())
            }
            OverlayView::Help(view) => {
                writeln!(f, "Recall Windows")?;
                for row in &view.rows {
                    let dot = if row.present { '●' } else { '○' };
                    if row.app.is_empty() {
                        writeln!(f, "  {} {}", dot, row.names)?;
                    } else {
                        writeln!(f, "  {} {}    {}", dot, row.names, row.app)?;
                    }
                    if let Some(path) = &row.path {
                        writeln!(f, "      {}", path)?;
                    }
                }
                writeln!(f, "Commands")?;
                let width = view.commands.iter().map(|(c, _)| c.len()).max().unwrap_or(0);
                for (cmd, desc) in &view.commands {
                    writeln!(f, "  {:<width$}  {}", cmd, desc, width = width)?;
                }
                writeln!(f, "\"recall close\" or Esc to close")
            }
            OverlayView::Prompt(view) => {
                writeln!(f, "{}", view.title)?;
                writeln!(f, "{}", view.subtitle)?;
                writeln!(f, "\"recall close\" to cancel")
            }
            OverlayView::Flash(message) => writeln!(f, "{}", message),
        }
    }
}
