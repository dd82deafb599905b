//! Label normalisation.

/// Canonical form of a spoken label: trimmed, lower-case, single spaces.
///
/// Returns an empty string for blank input; callers reject that.
pub fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// How a label is spoken: hyphens and underscores become spaces.
///
/// Two labels with the same spoken form cannot be told apart by voice.
pub fn spoken_label(label: &str) -> String {
    label
        .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lowercases_and_trims() {
        assert_eq!(normalize_label("  Edgar "), "edgar");
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize_label("big \t Red  Box"), "big red box");
    }

    #[test]
    fn test_normalize_blank_is_empty() {
        assert_eq!(normalize_label("   "), "");
    }

    #[test]
    fn test_spoken_label_drops_separators() {
        assert_eq!(spoken_label("web-app"), "web app");
        assert_eq!(spoken_label("api_gateway--logs"), "api gateway logs");
        assert_eq!(spoken_label("web app"), "web app");
    }
}
