//! Text normalization for comparison.

use std::sync::LazyLock;

use regex::Regex;

/// Anything that is not a letter, number or whitespace.
static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}\s]").expect("non-word pattern is valid"));

/// Lowercase `text`, drop everything that is not a letter, number or
/// whitespace, and collapse whitespace runs into single spaces.
///
/// Lowercasing happens first, so characters it introduces (such as the
/// combining dot of a lowercased `İ`) are filtered like any other. Marks
/// and punctuation are removed outright, so `"don't"` becomes `"dont"`.
///
/// # Examples
/// ```
/// use vreel_timeline::normalize_text;
/// assert_eq!(normalize_text("  Hello,   WORLD! "), "hello world");
/// assert_eq!(normalize_text("你好，世界。"), "你好世界");
/// ```
pub fn normalize_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = NON_WORD.replace_all(&lowered, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_strips_punctuation() {
        assert_eq!(normalize_text("Rust, is GREAT!"), "rust is great");
        assert_eq!(normalize_text("don't stop"), "dont stop");
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(normalize_text("a \t\n  b"), "a b");
        assert_eq!(normalize_text("   "), "");
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn test_punctuation_only_is_empty() {
        assert_eq!(normalize_text("!?。，..."), "");
    }

    #[test]
    fn test_punctuation_between_spaces_does_not_double_space() {
        assert_eq!(normalize_text("one - two"), "one two");
    }

    #[test]
    fn test_mixed_script() {
        assert_eq!(normalize_text("AI工具，提升效率 3 倍！"), "ai工具提升效率 3 倍");
    }

    #[test]
    fn test_full_width_punctuation() {
        assert_eq!(normalize_text("「测试」：好？"), "测试好");
    }

    #[test]
    fn test_lowercase_expansion_is_filtered() {
        // "İ" lowercases to "i" plus U+0307 COMBINING DOT ABOVE.
        assert_eq!(normalize_text("İstanbul"), "istanbul");
    }

    #[test]
    fn test_combining_marks_are_dropped() {
        // Devanagari vowel signs and virama are marks, not letters.
        assert_eq!(normalize_text("हिन्दी"), "हनद");
        assert_eq!(normalize_text("नमस्ते, दुनिया!"), "नमसत दनय");
    }
}
