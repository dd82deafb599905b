//! Command dispatcher.
//!
//! Coordinates the full pipeline from utterance parsing through registry
//! updates, persistence, window focus, dictation and overlay feedback.
//! Errors never escape: every failure becomes a flash message and a failed
//! [`Outcome`].

use std::collections::HashSet;
use std::path::Path;
use std::time::{Duration, Instant};

use recall_core::config::{GrammarConfig, RecallConfig, TerminalConfig};
use recall_core::host::{KeyboardInput, WindowSystem};
use recall_core::types::{WindowId, WindowInfo};
use recall_registry::{normalize_label, LabelRegistry, Promotion, RegistryStore, WindowEntry};
use tracing::{debug, error, info, warn};

use crate::dictation::DictationRouter;
use crate::error::DispatchError;
use crate::grammar::{CommandGrammar, Vocabulary};
use crate::overlay::{HelpView, LabelsView, OverlayLayer, OverlayPresenter, OverlaySurface};
use crate::pending::{PendingMode, PendingState};
use crate::terminal::{detect_path, rematch};
use crate::types::{Command, Outcome};

type DispatchResult = Result<Option<String>, DispatchError>;

/// Routes parsed commands to the registry, the host and the overlay.
///
/// Every call runs to completion on the caller's thread. Focus polling and
/// terminal relaunch wait with `std::thread::sleep`, so a session loop
/// driving the dispatcher stalls (overlay ticks included) until the command
/// returns.
pub struct Dispatcher<H, S> {
    host: H,
    registry: LabelRegistry,
    store: Option<RegistryStore>,
    grammar: CommandGrammar,
    vocabulary: Vocabulary,
    presenter: OverlayPresenter<S>,
    pending: PendingState,
    router: DictationRouter,
    grammar_config: GrammarConfig,
    terminal: TerminalConfig,
    persist_error: Option<String>,
}

impl<H, S> Dispatcher<H, S>
where
    H: WindowSystem + KeyboardInput,
    S: OverlaySurface,
{
    /// Create a dispatcher over an already loaded registry. Nothing is
    /// persisted until a store is attached with [`Dispatcher::with_store`].
    pub fn new(host: H, surface: S, registry: LabelRegistry, config: &RecallConfig) -> Self {
        let vocabulary =
            Vocabulary::from_registry(&registry, config.grammar.min_term_length);
        Self {
            host,
            registry,
            store: None,
            grammar: CommandGrammar::new(&config.grammar.enders),
            vocabulary,
            presenter: OverlayPresenter::new(surface, &config.overlay),
            pending: PendingState::new(),
            router: DictationRouter::new(&config.dictation),
            grammar_config: config.grammar.clone(),
            terminal: config.terminal.clone(),
            persist_error: None,
        }
    }

    /// Persist the registry to `store` after every change.
    pub fn with_store(mut self, store: RegistryStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn registry(&self) -> &LabelRegistry {
        &self.registry
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn presenter(&self) -> &OverlayPresenter<S> {
        &self.presenter
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn pending(&self) -> &PendingState {
        &self.pending
    }

    /// Parse and run an utterance. Returns `None` when it matched nothing.
    pub fn handle_utterance(&mut self, utterance: &str) -> Option<Outcome> {
        let command = self
            .grammar
            .parse(utterance, &self.vocabulary, self.pending.is_pending());
        match command {
            Some(command) => Some(self.execute(command)),
            None => {
                debug!(utterance, "No recall phrase matched");
                None
            }
        }
    }

    /// Run a command. Failures are flashed on the overlay.
    ///
    /// A failed write to the store does not undo the command: the change is
    /// kept in memory and the write error is appended to the flash and the
    /// outcome message.
    pub fn execute(&mut self, command: Command) -> Outcome {
        debug!(command = %command, "Dispatching");
        self.persist_error = None;
        let result = self.run(&command);
        let save_error = self.persist_error.take();
        match result {
            Ok(message) => match (message, save_error) {
                (Some(message), Some(err)) => {
                    let message = format!("{} ({})", message, err);
                    self.presenter.flash(message.clone());
                    Outcome::ok_with(&command, message)
                }
                (Some(message), None) | (None, Some(message)) => {
                    self.presenter.flash(message.clone());
                    Outcome::ok_with(&command, message)
                }
                (None, None) => Outcome::ok(&command),
            },
            Err(e) => {
                warn!(command = %command, error = %e, "Command failed");
                let message = match save_error {
                    Some(err) => format!("{} ({})", e, err),
                    None => e.to_string(),
                };
                self.presenter.flash(message.clone());
                Outcome::failed(&command, message)
            }
        }
    }

    /// Expire overlay layers. An expired prompt cancels the pending command.
    pub fn tick(&mut self, now: Instant) {
        let expired = self.presenter.tick(now);
        if expired.contains(&OverlayLayer::Prompt) && self.pending.cancel() {
            info!("Pending command expired");
        }
    }

    /// The host reports that a window closed. Entries bound to it are
    /// dropped.
    pub fn window_closed(&mut self, id: WindowId) -> Vec<String> {
        let removed = self.registry.remove_window(id);
        if !removed.is_empty() {
            self.registry_changed();
            if let Some(err) = self.persist_error.take() {
                self.presenter.flash(err);
            }
        }
        removed
    }

    fn run(&mut self, command: &Command) -> DispatchResult {
        match command {
            Command::SaveWindow { label } => self.save_window(label),
            Command::RecallWindow { label } => self.recall_window(label).map(|_| None),
            Command::RecallNumber { label, number } => {
                let window = self.recall_window(label)?;
                self.router.press_number(&mut self.host, window.id, *number)?;
                Ok(None)
            }
            Command::DictateToWindow { label, text } => self.dictate(label, text, false),
            Command::DictateToWindowAndEnter { label, text } => self.dictate(label, text, true),
            Command::ForgetWindow { label } => {
                let entry = self.registry.forget(label)?;
                self.registry_changed();
                Ok(Some(format!("forgot \"{}\"", entry.primary)))
            }
            Command::ForgetAllWindows => {
                let count = self.registry.forget_all();
                self.registry_changed();
                Ok(Some(format!("forgot all ({} windows)", count)))
            }
            Command::ListSavedWindows => {
                self.show_labels();
                Ok(None)
            }
            Command::ShowRecallHelp => {
                let view =
                    HelpView::build(&self.registry, &self.host.windows(), self.grammar.enders());
                self.presenter.show_help(view);
                Ok(None)
            }
            Command::HideRecallOverlay => {
                self.pending.cancel();
                self.presenter.hide();
                Ok(None)
            }
            Command::RecallAliasStart { label } => self.begin_pending(PendingMode::Alias, label),
            Command::RecallRenameStart { label } => self.begin_pending(PendingMode::Rename, label),
            Command::RecallCombineStart { label } => {
                self.begin_pending(PendingMode::Combine, label)
            }
            Command::RecallPendingFinish { spoken } => self.finish_pending(spoken),
            Command::AddRecallAlias { label, alias } => self.add_alias(label, alias),
            Command::RecallRename { label, new_label } => self.rename(label, new_label),
            Command::RecallCombine { primary, secondary } => self.combine(primary, secondary),
            Command::RecallPromote { label } => self.promote(label),
            Command::RestoreWindow { label } => self.restore_window(label),
        }
    }

    fn save_window(&mut self, label: &str) -> DispatchResult {
        let window = self
            .host
            .active_window()
            .ok_or(DispatchError::NoActiveWindow)?;
        let path = if self.terminal.is_terminal(&window.app.0) {
            detect_path(&self.host, &window)
        } else {
            None
        };
        let primary = self.registry.save(label, &window, path)?.primary.clone();
        self.registry_changed();
        Ok(Some(format!("saved \"{}\"", primary)))
    }

    /// Focus the window saved under `label`, re-matching a stale handle
    /// first. Returns the window that received focus.
    fn recall_window(&mut self, label: &str) -> Result<WindowInfo, DispatchError> {
        let entry = self.registry.resolve(label)?.clone();
        let window = self.locate(&entry)?;

        if self.terminal.is_terminal(&entry.app.0) {
            if let Some(path) = detect_path(&self.host, &window) {
                if self.registry.set_path(&entry.primary, path)? {
                    self.persist();
                }
            }
        }

        self.router.focus(&mut self.host, window.id)?;
        info!(label = %entry.primary, window = %window.id, "Window recalled");
        Ok(window)
    }

    fn locate(&mut self, entry: &WindowEntry) -> Result<WindowInfo, DispatchError> {
        let windows = self.host.windows();
        if let Some(window) = windows.iter().find(|w| w.id == entry.window) {
            return Ok(window.clone());
        }

        match rematch(&windows, entry) {
            Some(window) => {
                info!(label = %entry.primary, old = %entry.window, new = %window.id, "Stale window re-matched");
                self.registry.rebind(&entry.primary, &window)?;
                self.persist();
                Ok(window)
            }
            None => {
                self.show_labels();
                Err(DispatchError::WindowMissing(entry.primary.clone()))
            }
        }
    }

    fn dictate(&mut self, label: &str, text: &str, append_enter: bool) -> DispatchResult {
        let window = self.recall_window(label)?;
        self.router
            .dictate(&mut self.host, window.id, text, append_enter)?;
        Ok(None)
    }

    fn show_labels(&mut self) {
        let view = LabelsView::build(&self.registry, &self.host.windows());
        self.presenter.show_labels(view);
    }

    fn begin_pending(&mut self, mode: PendingMode, label: &str) -> DispatchResult {
        let primary = self.registry.resolve(label)?.primary.clone();
        let (title, subtitle) = mode.prompt(&primary);
        self.pending.begin(mode, primary);
        self.presenter.show_prompt(title, subtitle);
        Ok(None)
    }

    fn finish_pending(&mut self, spoken: &str) -> DispatchResult {
        let pending = self.pending.take().ok_or(DispatchError::NothingPending)?;
        self.presenter.hide_prompt();
        match pending.mode {
            PendingMode::Alias => self.add_alias(&pending.label, spoken),
            PendingMode::Rename => self.rename(&pending.label, spoken),
            PendingMode::Combine => self.combine(&pending.label, spoken),
        }
    }

    fn add_alias(&mut self, label: &str, alias: &str) -> DispatchResult {
        let primary = self.registry.resolve(label)?.primary.clone();
        if !self.registry.add_alias(&primary, alias)? {
            return Ok(None);
        }
        self.registry_changed();
        let alias = normalize_label(alias);
        Ok(Some(format!("alias: {} \u{2192} {}", alias, primary)))
    }

    fn rename(&mut self, label: &str, new_label: &str) -> DispatchResult {
        let old = self.registry.rename(label, new_label)?;
        let new = normalize_label(new_label);
        self.registry_changed();
        Ok(Some(format!("renamed: {} \u{2192} {}", old, new)))
    }

    fn combine(&mut self, primary: &str, secondary: &str) -> DispatchResult {
        let keep = self.registry.resolve(primary)?.primary.clone();
        let merge = self.registry.resolve(secondary)?.primary.clone();
        self.registry.combine(&keep, &merge)?;
        self.registry_changed();
        Ok(Some(format!("combined: {} \u{2192} {}", merge, keep)))
    }

    fn promote(&mut self, label: &str) -> DispatchResult {
        match self.registry.promote(label)? {
            Promotion::AlreadyPrimary => Ok(None),
            Promotion::Promoted { previous } => {
                self.registry_changed();
                let promoted = normalize_label(label);
                Ok(Some(format!("promoted: {} (was {})", promoted, previous)))
            }
        }
    }

    /// Relaunch a terminal at its saved directory. Anything else falls back
    /// to an ordinary recall.
    fn restore_window(&mut self, label: &str) -> DispatchResult {
        let entry = self.registry.resolve(label)?.clone();
        let path = match &entry.path {
            Some(path) if self.terminal.is_terminal(&entry.app.0) => path.clone(),
            _ => return self.recall_window(label).map(|_| None),
        };
        if !path.is_dir() {
            warn!(label = %entry.primary, path = %path.display(), "Saved path no longer exists");
            return self.recall_window(label).map(|_| None);
        }

        let window = self.launch_and_wait(&entry, &path)?;
        self.registry.rebind(&entry.primary, &window)?;
        self.persist();
        self.router.focus(&mut self.host, window.id)?;
        info!(label = %entry.primary, window = %window.id, "Terminal restored");
        Ok(None)
    }

    fn launch_and_wait(
        &mut self,
        entry: &WindowEntry,
        path: &Path,
    ) -> Result<WindowInfo, DispatchError> {
        let existing: HashSet<WindowId> = self
            .host
            .windows()
            .into_iter()
            .filter(|w| w.app == entry.app)
            .map(|w| w.id)
            .collect();

        self.host
            .launch_terminal(&entry.app, &self.terminal.launch_command, path)?;

        let poll = Duration::from_millis(self.terminal.launch_poll_millis);
        for attempt in 0..self.terminal.launch_poll_attempts {
            if attempt > 0 {
                std::thread::sleep(poll);
            }
            let fresh = self.host.windows().into_iter().find(|w| {
                w.app == entry.app && !existing.contains(&w.id) && w.rect.is_visible()
            });
            if let Some(window) = fresh {
                return Ok(window);
            }
        }
        Err(DispatchError::LaunchTimeout(entry.app.0.clone()))
    }

    /// Persist and rebuild the vocabulary after a registry mutation.
    fn registry_changed(&mut self) {
        self.persist();
        self.vocabulary =
            Vocabulary::from_registry(&self.registry, self.grammar_config.min_term_length);
        debug!(forms = self.vocabulary.len(), "Vocabulary rebuilt");
    }

    /// Write the registry to the store. A failure is kept for the caller
    /// to report; the in-memory registry stays authoritative.
    fn persist(&mut self) {
        let Some(store) = &self.store else {
            return;
        };
        if let Err(e) = store.save(&self.registry) {
            error!(path = %store.path().display(), error = %e, "Failed to persist saved windows");
            self.persist_error = Some(format!("could not save: {}", e));
        }
    }
}
