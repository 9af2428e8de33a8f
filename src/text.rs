//! Text normalization for OCR output
//!
//! OCR engines return raw text with ragged leading/trailing whitespace.
//! This module trims it into the canonical form shared by the store and
//! every exporter, and derives the character/word/line counts that
//! accompany exported text.

/// Character, word, and line counts derived from a canonical text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextCounts {
    /// Number of Unicode characters
    pub characters: usize,
    /// Number of whitespace-separated tokens
    pub words: usize,
    /// Number of newline-delimited segments; the empty string counts as one line
    pub lines: usize,
}

/// Normalizes raw OCR output into its canonical form.
///
/// Strips leading and trailing whitespace only. Interior line structure
/// and casing are preserved verbatim.
///
/// # Examples
/// ```
/// use textgrab::text::normalize;
///
/// assert_eq!(normalize("  hello\nworld \n"), "hello\nworld");
/// assert_eq!(normalize("\n\n"), "");
/// ```
pub fn normalize(raw: &str) -> String {
    raw.trim().to_string()
}

/// Derives character/word/line counts from a canonical text.
///
/// Counts are always computed from the text itself so they can never
/// drift out of sync with it.
///
/// # Examples
/// ```
/// use textgrab::text::counts;
///
/// let c = counts("hello world\nsecond line");
/// assert_eq!(c.characters, 23);
/// assert_eq!(c.words, 4);
/// assert_eq!(c.lines, 2);
///
/// let empty = counts("");
/// assert_eq!(empty.characters, 0);
/// assert_eq!(empty.words, 0);
/// assert_eq!(empty.lines, 1);
/// ```
pub fn counts(text: &str) -> TextCounts {
    TextCounts {
        characters: text.chars().count(),
        words: text.split_whitespace().count(),
        lines: text.split('\n').count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims_outer_whitespace_only() {
        assert_eq!(normalize("  line one\n  line two  "), "line one\n  line two");
        assert_eq!(normalize("\t\ntext\n\t"), "text");
        assert_eq!(normalize("unchanged"), "unchanged");
    }

    #[test]
    fn test_normalize_preserves_interior_blank_lines() {
        assert_eq!(normalize("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_counts_empty_text() {
        let c = counts("");
        assert_eq!(c.characters, 0);
        assert_eq!(c.words, 0);
        assert_eq!(c.lines, 1);
    }

    #[test]
    fn test_counts_unicode_characters() {
        // chars, not bytes
        let c = counts("héllo ✓");
        assert_eq!(c.characters, 7);
        assert_eq!(c.words, 2);
        assert_eq!(c.lines, 1);
    }

    #[test]
    fn test_counts_trailing_newline_adds_a_line() {
        let c = counts("one\ntwo\n");
        assert_eq!(c.lines, 3);
        assert_eq!(c.words, 2);
    }

    #[test]
    fn test_counts_collapse_repeated_spaces_into_word_boundaries() {
        let c = counts("a   b\t\tc");
        assert_eq!(c.words, 3);
    }
}
