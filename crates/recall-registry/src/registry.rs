//! In-memory label registry.
//!
//! Every label, primary or alias, belongs to exactly one entry. All
//! operations take labels in any casing and normalise them first.

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use recall_core::types::{Timestamp, WindowId, WindowInfo};
use tracing::{debug, info, warn};

use crate::entry::WindowEntry;
use crate::error::RegistryError;
use crate::label::{normalize_label, spoken_label};

/// Result of a promote request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Promotion {
    /// The label was already the primary; nothing changed.
    AlreadyPrimary,
    /// The alias is now primary; `previous` was demoted to an alias.
    Promoted { previous: String },
}

/// Registry of saved windows keyed by primary label.
#[derive(Debug, Clone, Default)]
pub struct LabelRegistry {
    entries: BTreeMap<String, WindowEntry>,
    reserved: HashSet<String>,
}

impl LabelRegistry {
    /// Create an empty registry with no reserved words.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry that refuses the given words as labels.
    pub fn with_reserved<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            entries: BTreeMap::new(),
            reserved: words
                .into_iter()
                .map(|w| normalize_label(w.as_ref()))
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    /// Replace the registry contents with previously stored entries.
    ///
    /// Entries whose labels collide with an already loaded entry lose the
    /// colliding labels; an entry whose primary collides is skipped.
    pub fn restore(&mut self, stored: Vec<WindowEntry>) {
        self.entries.clear();
        for mut entry in stored {
            entry.primary = normalize_label(&entry.primary);
            if entry.primary.is_empty() || self.owner_of(&entry.primary).is_some() {
                warn!(label = %entry.primary, "Skipping stored window with conflicting label");
                continue;
            }
            let aliases = std::mem::take(&mut entry.aliases);
            for alias in aliases {
                let alias = normalize_label(&alias);
                if alias.is_empty() || self.owner_of(&alias).is_some() {
                    warn!(alias = %alias, "Dropping conflicting stored alias");
                    continue;
                }
                entry.push_alias(&alias);
            }
            self.entries.insert(entry.primary.clone(), entry);
        }
        debug!(count = self.entries.len(), "Registry restored");
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by primary label.
    pub fn entries(&self) -> impl Iterator<Item = &WindowEntry> {
        self.entries.values()
    }

    pub fn is_reserved(&self, label: &str) -> bool {
        self.reserved.contains(&normalize_label(label))
    }

    /// Primary label of the entry that `label` (normalised) belongs to.
    fn owner_of(&self, label: &str) -> Option<&str> {
        if let Some((key, _)) = self.entries.get_key_value(label) {
            return Some(key.as_str());
        }
        self.entries
            .values()
            .find(|e| e.aliases.iter().any(|a| a == label))
            .map(|e| e.primary.as_str())
    }

    /// Entry other than `except` holding a label that is spelled differently
    /// from `label` but spoken the same ("web app" and "web-app").
    fn sound_alike_owner(&self, label: &str, except: Option<&str>) -> Option<&str> {
        let spoken = spoken_label(label);
        self.entries
            .values()
            .filter(|e| Some(e.primary.as_str()) != except)
            .find(|e| e.labels().any(|l| l != label && spoken_label(l) == spoken))
            .map(|e| e.primary.as_str())
    }

    fn reject_sound_alike(&self, label: &str, except: Option<&str>) -> Result<(), RegistryError> {
        match self.sound_alike_owner(label, except) {
            Some(owner) => Err(RegistryError::Ambiguous {
                label: label.to_string(),
                owner: owner.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn owner_or_not_found(&self, label: &str) -> Result<String, RegistryError> {
        let label = normalize_label(label);
        match self.owner_of(&label) {
            Some(owner) => Ok(owner.to_string()),
            None => Err(RegistryError::NotFound(label)),
        }
    }

    /// Normalise a label that is about to be bound, rejecting blanks and
    /// reserved words.
    fn bindable(&self, label: &str) -> Result<String, RegistryError> {
        let label = normalize_label(label);
        if label.is_empty() {
            return Err(RegistryError::EmptyLabel);
        }
        if self.reserved.contains(&label) {
            return Err(RegistryError::Reserved(label));
        }
        Ok(label)
    }

    fn entry_mut(&mut self, primary: &str) -> Result<&mut WindowEntry, RegistryError> {
        self.entries
            .get_mut(primary)
            .ok_or_else(|| RegistryError::NotFound(primary.to_string()))
    }

    /// Save `window` under `label`.
    ///
    /// Re-saving an existing primary rebinds it and keeps its aliases. Saving
    /// under an alias of the same window promotes that alias; an alias of a
    /// different window is ambiguous and rejected.
    pub fn save(
        &mut self,
        label: &str,
        window: &WindowInfo,
        path: Option<PathBuf>,
    ) -> Result<&WindowEntry, RegistryError> {
        let label = self.bindable(label)?;

        match self.owner_of(&label).map(str::to_string) {
            Some(owner) if owner == label => {
                let entry = self.entry_mut(&owner)?;
                entry.window = window.id;
                entry.app = window.app.clone();
                entry.title = window.title.clone();
                entry.path = path;
                entry.created_at = Timestamp::now();
                info!(label = %label, window = %window.id, "Window re-saved");
            }
            Some(owner) => {
                let bound_to = self.entry_mut(&owner)?.window;
                if bound_to != window.id {
                    return Err(RegistryError::Ambiguous { label, owner });
                }
                self.promote(&label)?;
                let entry = self.entry_mut(&label)?;
                entry.title = window.title.clone();
                entry.path = path;
                info!(label = %label, previous = %owner, "Window re-saved under its alias");
            }
            None => {
                self.reject_sound_alike(&label, None)?;
                let entry = WindowEntry::new(label.clone(), window, path);
                self.entries.insert(label.clone(), entry);
                info!(label = %label, window = %window.id, app = %window.app, "Window saved");
            }
        }

        self.entry_mut(&label).map(|e| &*e)
    }

    /// Look up the entry that `label` (primary or alias) belongs to.
    pub fn resolve(&self, label: &str) -> Result<&WindowEntry, RegistryError> {
        let owner = self.owner_or_not_found(label)?;
        self.entries
            .get(&owner)
            .ok_or(RegistryError::NotFound(owner))
    }

    /// Remove the entry owning `label`, together with all its aliases.
    pub fn forget(&mut self, label: &str) -> Result<WindowEntry, RegistryError> {
        let owner = self.owner_or_not_found(label)?;
        let entry = self
            .entries
            .remove(&owner)
            .ok_or(RegistryError::NotFound(owner))?;
        info!(label = %entry.primary, aliases = entry.aliases.len(), "Window forgotten");
        Ok(entry)
    }

    /// Remove everything. Returns the number of entries removed.
    pub fn forget_all(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        info!(count, "All windows forgotten");
        count
    }

    /// Bind `alias` to the entry owning `label`.
    ///
    /// Returns `Ok(false)` when the alias already points at that entry.
    pub fn add_alias(&mut self, label: &str, alias: &str) -> Result<bool, RegistryError> {
        let owner = self.owner_or_not_found(label)?;
        let alias = self.bindable(alias)?;

        match self.owner_of(&alias) {
            Some(other) if other == owner => return Ok(false),
            Some(other) => {
                return Err(RegistryError::Ambiguous {
                    label: alias,
                    owner: other.to_string(),
                })
            }
            None => self.reject_sound_alike(&alias, Some(owner.as_str()))?,
        }

        let added = self.entry_mut(&owner)?.push_alias(&alias);
        info!(alias = %alias, label = %owner, "Alias added");
        Ok(added)
    }

    /// Re-key the entry owning `label` under `new_primary`.
    ///
    /// The old primary label is discarded; aliases are kept. Returns the old
    /// primary label.
    pub fn rename(&mut self, label: &str, new_primary: &str) -> Result<String, RegistryError> {
        let owner = self.owner_or_not_found(label)?;
        let new_primary = self.bindable(new_primary)?;

        if new_primary == owner {
            return Ok(owner);
        }
        if let Some(other) = self.owner_of(&new_primary) {
            if other != owner {
                return Err(RegistryError::Ambiguous {
                    label: new_primary,
                    owner: other.to_string(),
                });
            }
        }
        self.reject_sound_alike(&new_primary, Some(owner.as_str()))?;

        let mut entry = self
            .entries
            .remove(&owner)
            .ok_or_else(|| RegistryError::NotFound(owner.clone()))?;
        entry.drop_alias(&new_primary);
        entry.primary = new_primary.clone();
        self.entries.insert(new_primary.clone(), entry);
        info!(from = %owner, to = %new_primary, "Window renamed");
        Ok(owner)
    }

    /// Make `alias` the primary label of its entry, demoting the old primary
    /// to an alias.
    pub fn promote(&mut self, alias: &str) -> Result<Promotion, RegistryError> {
        let alias = normalize_label(alias);
        if self.reserved.contains(&alias) {
            return Err(RegistryError::Reserved(alias));
        }
        let owner = self.owner_or_not_found(&alias)?;
        if owner == alias {
            return Ok(Promotion::AlreadyPrimary);
        }

        let mut entry = self
            .entries
            .remove(&owner)
            .ok_or_else(|| RegistryError::NotFound(owner.clone()))?;
        entry.drop_alias(&alias);
        entry.aliases.push(owner.clone());
        entry.primary = alias.clone();
        self.entries.insert(alias.clone(), entry);
        info!(label = %alias, previous = %owner, "Alias promoted");
        Ok(Promotion::Promoted { previous: owner })
    }

    /// Merge the entry owning `secondary` into the entry owning `primary`.
    ///
    /// The secondary's primary label and aliases become aliases of the
    /// primary entry, which also inherits the secondary's path when it has
    /// none. The secondary entry is removed.
    pub fn combine(&mut self, primary: &str, secondary: &str) -> Result<(), RegistryError> {
        let keep = self.owner_or_not_found(primary)?;
        let merge = self.owner_or_not_found(secondary)?;
        if keep == merge {
            return Err(RegistryError::SameEntry(
                normalize_label(primary),
                normalize_label(secondary),
            ));
        }

        let merged = self
            .entries
            .remove(&merge)
            .ok_or_else(|| RegistryError::NotFound(merge.clone()))?;
        let target = self.entry_mut(&keep)?;
        for label in merged.labels() {
            target.push_alias(label);
        }
        if target.path.is_none() {
            target.path = merged.path;
        }
        info!(from = %merge, into = %keep, "Windows combined");
        Ok(())
    }

    /// Drop every entry bound to a window that has closed. Returns the
    /// primary labels removed.
    pub fn remove_window(&mut self, id: WindowId) -> Vec<String> {
        let removed: Vec<String> = self
            .entries
            .values()
            .filter(|e| e.window == id)
            .map(|e| e.primary.clone())
            .collect();
        for label in &removed {
            self.entries.remove(label);
        }
        if !removed.is_empty() {
            info!(window = %id, labels = ?removed, "Closed window removed from registry");
        }
        removed
    }

    /// Point the entry owning `label` at a different window handle, after a
    /// re-match or relaunch.
    pub fn rebind(&mut self, label: &str, window: &WindowInfo) -> Result<(), RegistryError> {
        let owner = self.owner_or_not_found(label)?;
        let entry = self.entry_mut(&owner)?;
        entry.window = window.id;
        entry.title = window.title.clone();
        debug!(label = %owner, window = %window.id, "Window rebound");
        Ok(())
    }

    /// Update the working directory of a terminal entry. Returns whether it
    /// changed.
    pub fn set_path(&mut self, label: &str, path: PathBuf) -> Result<bool, RegistryError> {
        let owner = self.owner_or_not_found(label)?;
        let entry = self.entry_mut(&owner)?;
        if entry.path.as_ref() == Some(&path) {
            return Ok(false);
        }
        debug!(label = %owner, path = %path.display(), "Terminal path updated");
        entry.path = Some(path);
        Ok(true)
    }
}

// =============================================================================
// Tests
// =============================================================================
