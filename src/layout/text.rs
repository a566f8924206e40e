use once_cell::sync::Lazy;
use regex::Regex;

// ASCII classes spelled out: a label breaks only where a browser's `\W*\w+\W*` would.
static WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]*[A-Za-z0-9_]+[^A-Za-z0-9_]*").unwrap());

const WRAP_TOLERANCE: f64 = 1e-6;

/// Splits a label into the chunks a renderer may break lines between.
///
/// Each chunk is one run of word characters with the punctuation and
/// whitespace around it attached. A label with no word characters at all,
/// including the empty label, is a single chunk.
pub fn split_words(label: &str) -> Vec<&str> {
    let words: Vec<&str> = WORD_RE.find_iter(label).map(|m| m.as_str()).collect();
    if words.is_empty() {
        return vec![label];
    }
    words
}

/// Greedily packs words into rows no wider than `max_width`.
///
/// Words are never split or reordered; a word wider than `max_width` gets a
/// row of its own.
pub fn wrap_words(words: &[&str], widths: &[f64], max_width: f64) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0;
    for (word, width) in words.iter().zip(widths) {
        if !current.is_empty() && current_width + width > max_width + WRAP_TOLERANCE {
            lines.push(current.trim_end().to_string());
            current.clear();
            current_width = 0.0;
        }
        current.push_str(word);
        current_width += width;
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current.trim_end().to_string());
    }
    lines
}

/// Display string for the operation half of a node.
///
/// A vertex that stands for several operations shows a count instead of
/// any single name.
pub fn operation_label<S: AsRef<str>>(operations: &[S]) -> Option<String> {
    match operations {
        [] => None,
        [single] => Some(single.as_ref().to_string()),
        many => Some(format!("{} Operations", many.len())),
    }
}

pub(crate) fn char_width_factor(ch: char) -> f64 {
    // Em-relative advances of a Helvetica-like sans serif at regular weight.
    match ch {
        ' ' => 0.278,
        '\\' | '.' | ',' | ':' | ';' | '|' | '!' | '\'' => 0.278,
        '(' | ')' | '[' | ']' | '{' | '}' => 0.333,
        '-' => 0.333,
        '_' => 0.556,
        '/' => 0.278,
        'A' | 'B' => 0.667,
        'C' | 'D' => 0.722,
        'E' => 0.667,
        'F' => 0.611,
        'G' => 0.778,
        'H' => 0.722,
        'I' => 0.278,
        'J' => 0.5,
        'K' => 0.667,
        'L' => 0.556,
        'M' => 0.833,
        'N' => 0.722,
        'O' => 0.778,
        'P' => 0.667,
        'Q' => 0.778,
        'R' => 0.722,
        'S' => 0.667,
        'T' => 0.611,
        'U' => 0.722,
        'V' => 0.667,
        'W' => 0.944,
        'X' | 'Y' => 0.667,
        'Z' => 0.611,
        'a' | 'b' | 'd' | 'e' | 'g' | 'h' | 'n' | 'o' | 'p' | 'q' | 'u' => 0.556,
        'c' | 'k' | 's' | 'v' | 'x' | 'y' | 'z' => 0.5,
        'f' | 't' => 0.278,
        'i' | 'j' | 'l' => 0.222,
        'm' => 0.833,
        'r' => 0.333,
        'w' => 0.722,
        '0'..='9' => 0.556,
        '@' => 1.015,
        '#' | '$' | '*' | '+' | '<' | '=' | '>' => 0.584,
        '%' => 0.889,
        '&' => 0.667,
        _ => 0.568,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_words_keeps_punctuation_with_words() {
        assert_eq!(split_words("foo-bar baz"), vec!["foo-", "bar ", "baz"]);
        assert_eq!(
            split_words("Hello, world! How are you?"),
            vec!["Hello, ", "world! ", "How ", "are ", "you?"]
        );
    }

    #[test]
    fn split_words_attaches_leading_punctuation() {
        assert_eq!(split_words("/api/v1"), vec!["/api/", "v1"]);
        assert_eq!(split_words("  padded"), vec!["  padded"]);
    }

    #[test]
    fn split_words_falls_back_to_whole_label() {
        assert_eq!(split_words(""), vec![""]);
        assert_eq!(split_words("---"), vec!["---"]);
    }

    #[test]
    fn split_words_treats_non_ascii_letters_as_separators() {
        assert_eq!(split_words("caf\u{e9} au"), vec!["caf\u{e9} ", "au"]);
    }

    #[test]
    fn split_words_chunks_reassemble_label() {
        let label = "very-long-service-name-with-several-words";
        assert_eq!(split_words(label).concat(), label);
    }

    #[test]
    fn wrap_words_does_not_wrap_when_width_allows() {
        let words = ["foo-", "bar ", "baz"];
        let lines = wrap_words(&words, &[4.0, 4.0, 3.0], 11.0);
        assert_eq!(lines, vec!["foo-bar baz"]);
    }

    #[test]
    fn wrap_words_breaks_between_words() {
        let words = ["alpha ", "beta ", "gamma"];
        let lines = wrap_words(&words, &[6.0, 5.0, 5.0], 11.0);
        assert_eq!(lines, vec!["alpha beta", "gamma"]);
    }

    #[test]
    fn wrap_words_gives_oversized_word_its_own_row() {
        let words = ["a ", "enormous ", "b"];
        let lines = wrap_words(&words, &[2.0, 9.0, 1.0], 4.0);
        assert_eq!(lines, vec!["a", "enormous", "b"]);
    }

    #[test]
    fn wrap_words_empty_label_yields_one_row() {
        assert_eq!(wrap_words(&[""], &[0.0], 10.0), vec![""]);
    }

    #[test]
    fn operation_label_summarizes_lists() {
        let none: [&str; 0] = [];
        assert_eq!(operation_label(&none), None);
        assert_eq!(operation_label(&["GET /"]), Some("GET /".to_string()));
        assert_eq!(
            operation_label(&["op0", "op1", "op2", "op3"]),
            Some("4 Operations".to_string())
        );
    }

    #[test]
    fn char_width_factor_returns_positive_values() {
        for ch in ['a', 'Z', ' ', '0', '@', '-', '\u{4e2d}'] {
            assert!(char_width_factor(ch) > 0.0, "char {:?} has zero width", ch);
        }
    }
}
