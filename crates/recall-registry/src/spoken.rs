//! Spoken-form vocabulary for the grammar.
//!
//! Builds the map from everything a user may say to the primary label it
//! stands for. Full labels always win; single words of multi-word labels are
//! added afterwards when nothing else claimed them.

use std::collections::BTreeMap;

use crate::label::spoken_label;
use crate::registry::LabelRegistry;

/// Map of spoken form to primary label.
///
/// Hyphens and underscores in labels are spoken as spaces; the registry
/// keeps two entries from sharing a spoken form. Individual words shorter
/// than `min_term_length` are not added on their own.
pub fn spoken_forms(registry: &LabelRegistry, min_term_length: usize) -> BTreeMap<String, String> {
    let mut forms = BTreeMap::new();

    for entry in registry.entries() {
        for label in entry.labels() {
            forms.insert(spoken_label(label), entry.primary.clone());
        }
    }

    for entry in registry.entries() {
        for label in entry.labels() {
            let spoken = spoken_label(label);
            if !spoken.contains(' ') {
                continue;
            }
            for word in spoken.split(' ') {
                if word.chars().count() >= min_term_length && !forms.contains_key(word) {
                    forms.insert(word.to_string(), entry.primary.clone());
                }
            }
        }
    }

    forms
}
