//! Small spoken numbers, zero through twenty.

const NUMBER_WORDS: [(&str, u8); 22] = [
    ("zero", 0),
    ("oh", 0),
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
    ("nine", 9),
    ("ten", 10),
    ("eleven", 11),
    ("twelve", 12),
    ("thirteen", 13),
    ("fourteen", 14),
    ("fifteen", 15),
    ("sixteen", 16),
    ("seventeen", 17),
    ("eighteen", 18),
    ("nineteen", 19),
    ("twenty", 20),
];

/// Parse a single word as a small number. Digits are accepted too, since
/// some transcribers emit them.
pub fn parse_small_number(word: &str) -> Option<u8> {
    let word = word.to_lowercase();
    if let Some((_, n)) = NUMBER_WORDS.iter().find(|(w, _)| *w == word) {
        return Some(*n);
    }
    match word.parse::<u8>() {
        Ok(n) if n <= 20 => Some(n),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_words() {
        assert_eq!(parse_small_number("zero"), Some(0));
        assert_eq!(parse_small_number("oh"), Some(0));
        assert_eq!(parse_small_number("Three"), Some(3));
        assert_eq!(parse_small_number("twenty"), Some(20));
    }

    #[test]
    fn test_digits() {
        assert_eq!(parse_small_number("7"), Some(7));
        assert_eq!(parse_small_number("20"), Some(20));
        assert_eq!(parse_small_number("21"), None);
    }

    #[test]
    fn test_not_a_number() {
        assert_eq!(parse_small_number("hello"), None);
        assert_eq!(parse_small_number("twentyone"), None);
        assert_eq!(parse_small_number(""), None);
    }
}
