//! Regex patterns for the fixed `recall ...` phrases.
//!
//! Patterns are checked in declaration order and the first match wins, so
//! more specific phrases ("recall forget all") come before the general ones
//! ("recall forget <name>").

use regex::Regex;

/// Which fixed phrase matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Close,
    Help,
    List,
    ForgetAll,
    Forget,
    Save,
    Restore,
    Alias,
    Rename,
    Combine,
    Promote,
}

/// A single compiled regex pattern linked to a rule.
pub struct CommandPattern {
    pub regex: Regex,
    pub rule: Rule,
}

/// A match result from pattern detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    pub rule: Rule,
    /// Text captured after the command words, case preserved. Empty for
    /// phrases without an argument.
    pub argument: String,
}

/// Collection of all command patterns, compiled once and reused.
pub struct PatternSet {
    patterns: Vec<CommandPattern>,
}

impl Default for PatternSet {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternSet {
    /// Create a new PatternSet with all compiled patterns.
    pub fn new() -> Self {
        let table: Vec<(&str, Rule)> = vec![
            (r"(?i)^recall\s+close$", Rule::Close),
            (r"(?i)^recall\s+help$", Rule::Help),
            (r"(?i)^(?:recall\s+list|list\s+recalls)$", Rule::List),
            (r"(?i)^recall\s+forget\s+all$", Rule::ForgetAll),
            (r"(?i)^recall\s+forget\s+(.+)$", Rule::Forget),
            (r"(?i)^recall\s+(?:assign|save)\s+(.+)$", Rule::Save),
            (r"(?i)^recall\s+restore\s+(.+)$", Rule::Restore),
            (r"(?i)^recall\s+alias\s+(.+)$", Rule::Alias),
            (r"(?i)^recall\s+rename\s+(.+)$", Rule::Rename),
            (r"(?i)^recall\s+combine\s+(.+)$", Rule::Combine),
            (r"(?i)^recall\s+promote\s+(.+)$", Rule::Promote),
        ];

        let patterns = table
            .into_iter()
            .map(|(pat, rule)| CommandPattern {
                regex: Regex::new(pat).expect("Invalid command regex"),
                rule,
            })
            .collect();

        Self { patterns }
    }

    /// Find the first pattern matching the whole utterance.
    pub fn detect(&self, utterance: &str) -> Option<RuleMatch> {
        let utterance = utterance.trim();
        self.patterns.iter().find_map(|pattern| {
            pattern.regex.captures(utterance).map(|caps| RuleMatch {
                rule: pattern.rule,
                argument: caps
                    .get(1)
                    .map_or("", |m| m.as_str())
                    .trim()
                    .to_string(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ps() -> PatternSet {
        PatternSet::new()
    }

    fn rule(text: &str) -> Option<Rule> {
        ps().detect(text).map(|m| m.rule)
    }

    #[test]
    fn test_fixed_phrases() {
        assert_eq!(rule("recall close"), Some(Rule::Close));
        assert_eq!(rule("Recall Help"), Some(Rule::Help));
        assert_eq!(rule("recall list"), Some(Rule::List));
        assert_eq!(rule("list recalls"), Some(Rule::List));
    }

    #[test]
    fn test_forget_all_before_forget() {
        let m = ps().detect("recall forget all").unwrap();
        assert_eq!(m.rule, Rule::ForgetAll);
        assert!(m.argument.is_empty());

        let m = ps().detect("recall forget edgar").unwrap();
        assert_eq!(m.rule, Rule::Forget);
        assert_eq!(m.argument, "edgar");
    }

    #[test]
    fn test_save_and_assign_synonyms() {
        let m = ps().detect("recall assign Big Box").unwrap();
        assert_eq!(m.rule, Rule::Save);
        assert_eq!(m.argument, "Big Box");

        let m = ps().detect("recall save edgar").unwrap();
        assert_eq!(m.rule, Rule::Save);
    }

    #[test]
    fn test_argument_rules() {
        assert_eq!(rule("recall restore edgar"), Some(Rule::Restore));
        assert_eq!(rule("recall alias edgar ed"), Some(Rule::Alias));
        assert_eq!(rule("recall rename edgar allan"), Some(Rule::Rename));
        assert_eq!(rule("recall combine velma vilma"), Some(Rule::Combine));
        assert_eq!(rule("recall promote ed"), Some(Rule::Promote));
    }

    #[test]
    fn test_whole_utterance_required() {
        assert_eq!(rule("please recall help"), None);
        assert_eq!(rule("recall help me"), None);
        assert_eq!(rule("recall"), None);
        assert_eq!(rule("recall forget"), None);
    }

    #[test]
    fn test_extra_whitespace_tolerated() {
        let m = ps().detect("  recall   alias  edgar   ed ").unwrap();
        assert_eq!(m.rule, Rule::Alias);
        assert_eq!(m.argument, "edgar   ed");
    }
}
