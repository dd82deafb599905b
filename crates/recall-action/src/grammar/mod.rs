//! Phrase grammar.
//!
//! Turns a transcribed utterance into a [`Command`]. Fixed `recall ...`
//! phrases are matched with regex patterns; saved window names are matched
//! against a [`Vocabulary`] of spoken forms rebuilt whenever the registry
//! changes.

pub mod numbers;
pub mod patterns;

use std::collections::BTreeMap;

use recall_registry::{spoken_forms, LabelRegistry};

use crate::types::Command;
use numbers::parse_small_number;
use patterns::{PatternSet, Rule, RuleMatch};

/// Spoken forms of every saved window, mapped to primary labels.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    forms: BTreeMap<String, String>,
    max_words: usize,
}

impl Vocabulary {
    pub fn new(forms: BTreeMap<String, String>) -> Self {
        let max_words = forms
            .keys()
            .map(|k| k.split(' ').count())
            .max()
            .unwrap_or(0);
        Self { forms, max_words }
    }

    pub fn from_registry(registry: &LabelRegistry, min_term_length: usize) -> Self {
        Self::new(spoken_forms(registry, min_term_length))
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    /// Primary label for an exact spoken form.
    pub fn lookup(&self, spoken: &str) -> Option<&str> {
        self.forms.get(&spoken.to_lowercase()).map(String::as_str)
    }

    /// Longest spoken form at the start of `words`. Returns the primary label
    /// and how many words it consumed.
    pub fn match_prefix(&self, words: &[&str]) -> Option<(&str, usize)> {
        let longest = self.max_words.min(words.len());
        (1..=longest).rev().find_map(|n| {
            self.lookup(&words[..n].join(" "))
                .map(|primary| (primary, n))
        })
    }

    /// Primary label when `words` is exactly one spoken form.
    pub fn match_exact(&self, words: &[&str]) -> Option<&str> {
        match self.match_prefix(words) {
            Some((primary, n)) if n == words.len() => Some(primary),
            _ => None,
        }
    }
}

/// The full recall grammar.
pub struct CommandGrammar {
    patterns: PatternSet,
    enders: Vec<String>,
}

impl CommandGrammar {
    /// Build the grammar. `enders` are words that, said at the end of a
    /// dictation, press Enter afterwards.
    pub fn new(enders: &[String]) -> Self {
        Self {
            patterns: PatternSet::new(),
            enders: enders.iter().map(|e| e.to_lowercase()).collect(),
        }
    }

    pub fn enders(&self) -> &[String] {
        &self.enders
    }

    /// Parse an utterance.
    ///
    /// While a two-step command is `pending`, everything except
    /// "recall close" completes it. Returns `None` when nothing matches.
    pub fn parse(&self, utterance: &str, vocabulary: &Vocabulary, pending: bool) -> Option<Command> {
        let words: Vec<&str> = utterance.split_whitespace().collect();
        if words.is_empty() {
            return None;
        }
        let text = words.join(" ");

        if pending {
            return match self.patterns.detect(&text) {
                Some(RuleMatch {
                    rule: Rule::Close, ..
                }) => Some(Command::HideRecallOverlay),
                _ => Some(Command::RecallPendingFinish { spoken: text }),
            };
        }

        if let Some(m) = self.patterns.detect(&text) {
            return self.parse_rule(m, vocabulary);
        }

        self.parse_window_phrase(&words, vocabulary)
    }

    fn parse_rule(&self, m: RuleMatch, vocabulary: &Vocabulary) -> Option<Command> {
        let args: Vec<&str> = m.argument.split_whitespace().collect();
        let command = match m.rule {
            Rule::Close => Command::HideRecallOverlay,
            Rule::Help => Command::ShowRecallHelp,
            Rule::List => Command::ListSavedWindows,
            Rule::ForgetAll => Command::ForgetAllWindows,
            Rule::Save => Command::SaveWindow {
                label: args.join(" "),
            },
            Rule::Promote => Command::RecallPromote {
                label: args.join(" "),
            },
            Rule::Forget => Command::ForgetWindow {
                label: vocabulary.match_exact(&args)?.to_string(),
            },
            Rule::Restore => Command::RestoreWindow {
                label: vocabulary.match_exact(&args)?.to_string(),
            },
            Rule::Alias | Rule::Rename | Rule::Combine => {
                let (label, n) = vocabulary.match_prefix(&args)?;
                let label = label.to_string();
                let rest = &args[n..];
                match (m.rule, rest.is_empty()) {
                    (Rule::Alias, true) => Command::RecallAliasStart { label },
                    (Rule::Rename, true) => Command::RecallRenameStart { label },
                    (Rule::Combine, true) => Command::RecallCombineStart { label },
                    (Rule::Alias, false) => Command::AddRecallAlias {
                        label,
                        alias: rest.join(" "),
                    },
                    (Rule::Rename, false) => Command::RecallRename {
                        label,
                        new_label: rest.join(" "),
                    },
                    _ => Command::RecallCombine {
                        primary: label,
                        secondary: vocabulary.match_exact(rest)?.to_string(),
                    },
                }
            }
        };
        Some(command)
    }

    fn parse_window_phrase(&self, words: &[&str], vocabulary: &Vocabulary) -> Option<Command> {
        let (label, n) = vocabulary.match_prefix(words)?;
        let label = label.to_string();
        let rest = &words[n..];

        let Some((last, body)) = rest.split_last() else {
            return Some(Command::RecallWindow { label });
        };

        if body.is_empty() {
            if let Some(number) = parse_small_number(last) {
                return Some(Command::RecallNumber { label, number });
            }
        }

        // A lone ender is ordinary dictation.
        if !body.is_empty() && self.enders.iter().any(|e| e.eq_ignore_ascii_case(last)) {
            return Some(Command::DictateToWindowAndEnter {
                label,
                text: body.join(" "),
            });
        }

        Some(Command::DictateToWindow {
            label,
            text: rest.join(" "),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recall_core::types::{Rect, WindowInfo};

    fn vocabulary() -> Vocabulary {
        let mut reg = LabelRegistry::new();
        let w = |id| WindowInfo::new(id, "app", "t", Rect::default());
        reg.save("edgar", &w(1), None).unwrap();
        reg.add_alias("edgar", "ed").unwrap();
        reg.save("velma", &w(2), None).unwrap();
        reg.save("vilma", &w(3), None).unwrap();
        reg.save("big red box", &w(4), None).unwrap();
        Vocabulary::from_registry(&reg, 3)
    }

    fn grammar() -> CommandGrammar {
        CommandGrammar::new(&["bravely".to_string()])
    }

    fn parse(text: &str) -> Option<Command> {
        grammar().parse(text, &vocabulary(), false)
    }

    #[test]
    fn test_vocabulary_longest_prefix() {
        let vocab = vocabulary();
        assert_eq!(
            vocab.match_prefix(&["big", "red", "box", "hello"]),
            Some(("big red box", 3))
        );
        assert_eq!(vocab.match_prefix(&["red", "hello"]), Some(("big red box", 1)));
        assert_eq!(vocab.match_prefix(&["nobody"]), None);
        assert_eq!(vocab.match_exact(&["Ed"]), Some("edgar"));
        assert_eq!(vocab.match_exact(&["ed", "hello"]), None);
    }

    #[test]
    fn test_bare_name_recalls() {
        assert_eq!(
            parse("edgar"),
            Some(Command::RecallWindow {
                label: "edgar".into()
            })
        );
        assert_eq!(
            parse("Ed"),
            Some(Command::RecallWindow {
                label: "edgar".into()
            })
        );
    }

    #[test]
    fn test_name_then_number() {
        assert_eq!(
            parse("edgar three"),
            Some(Command::RecallNumber {
                label: "edgar".into(),
                number: 3
            })
        );
    }

    #[test]
    fn test_name_then_dictation() {
        assert_eq!(
            parse("edgar Hello World"),
            Some(Command::DictateToWindow {
                label: "edgar".into(),
                text: "Hello World".into()
            })
        );
        assert_eq!(
            parse("big red box three little pigs"),
            Some(Command::DictateToWindow {
                label: "big red box".into(),
                text: "three little pigs".into()
            })
        );
    }

    #[test]
    fn test_dictation_with_ender() {
        assert_eq!(
            parse("edgar git status bravely"),
            Some(Command::DictateToWindowAndEnter {
                label: "edgar".into(),
                text: "git status".into()
            })
        );
    }

    #[test]
    fn test_lone_ender_is_dictated() {
        assert_eq!(
            parse("edgar bravely"),
            Some(Command::DictateToWindow {
                label: "edgar".into(),
                text: "bravely".into()
            })
        );
    }

    #[test]
    fn test_unknown_phrase_is_none() {
        assert_eq!(parse("daphne hello"), None);
        assert_eq!(parse("   "), None);
        assert_eq!(parse("recall forget daphne"), None);
    }

    #[test]
    fn test_save_takes_free_text() {
        assert_eq!(
            parse("recall assign Daphne"),
            Some(Command::SaveWindow {
                label: "Daphne".into()
            })
        );
    }

    #[test]
    fn test_fixed_commands() {
        assert_eq!(parse("recall list"), Some(Command::ListSavedWindows));
        assert_eq!(parse("list recalls"), Some(Command::ListSavedWindows));
        assert_eq!(parse("recall help"), Some(Command::ShowRecallHelp));
        assert_eq!(parse("recall close"), Some(Command::HideRecallOverlay));
        assert_eq!(parse("recall forget all"), Some(Command::ForgetAllWindows));
    }

    #[test]
    fn test_forget_and_restore_resolve_aliases() {
        assert_eq!(
            parse("recall forget ed"),
            Some(Command::ForgetWindow {
                label: "edgar".into()
            })
        );
        assert_eq!(
            parse("recall restore big red box"),
            Some(Command::RestoreWindow {
                label: "big red box".into()
            })
        );
    }

    #[test]
    fn test_two_step_starts() {
        assert_eq!(
            parse("recall alias edgar"),
            Some(Command::RecallAliasStart {
                label: "edgar".into()
            })
        );
        assert_eq!(
            parse("recall rename velma"),
            Some(Command::RecallRenameStart {
                label: "velma".into()
            })
        );
        assert_eq!(
            parse("recall combine velma"),
            Some(Command::RecallCombineStart {
                label: "velma".into()
            })
        );
    }

    #[test]
    fn test_one_shot_alias_rename_combine() {
        assert_eq!(
            parse("recall alias edgar poe"),
            Some(Command::AddRecallAlias {
                label: "edgar".into(),
                alias: "poe".into()
            })
        );
        assert_eq!(
            parse("recall rename velma dinkley"),
            Some(Command::RecallRename {
                label: "velma".into(),
                new_label: "dinkley".into()
            })
        );
        assert_eq!(
            parse("recall combine velma vilma"),
            Some(Command::RecallCombine {
                primary: "velma".into(),
                secondary: "vilma".into()
            })
        );
        assert_eq!(parse("recall combine velma daphne"), None);
    }

    #[test]
    fn test_promote_keeps_spoken_text() {
        assert_eq!(
            parse("recall promote ed"),
            Some(Command::RecallPromote { label: "ed".into() })
        );
    }

    #[test]
    fn test_pending_captures_anything_but_close() {
        let g = grammar();
        let vocab = vocabulary();
        assert_eq!(
            g.parse("eddie  boy", &vocab, true),
            Some(Command::RecallPendingFinish {
                spoken: "eddie boy".into()
            })
        );
        assert_eq!(
            g.parse("edgar", &vocab, true),
            Some(Command::RecallPendingFinish {
                spoken: "edgar".into()
            })
        );
        assert_eq!(
            g.parse("recall close", &vocab, true),
            Some(Command::HideRecallOverlay)
        );
    }

    #[test]
    fn test_empty_vocabulary_only_fixed_phrases() {
        let g = grammar();
        let vocab = Vocabulary::default();
        assert_eq!(g.parse("edgar", &vocab, false), None);
        assert_eq!(
            g.parse("recall help", &vocab, false),
            Some(Command::ShowRecallHelp)
        );
    }
}
