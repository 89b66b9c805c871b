//! Target-text tokenization.

use unicode_segmentation::UnicodeSegmentation;

use crate::TypingError;

/// Split `text` into words, dropping every run of whitespace.
///
/// Returns [`TypingError::EmptyInput`] if no word remains.
pub fn tokenize(text: &str) -> Result<Vec<&str>, TypingError> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Err(TypingError::EmptyInput);
    }
    Ok(words)
}

/// Split a word into user-perceived characters (extended grapheme clusters).
///
/// A keystroke is matched against one grapheme, so `"e\u{301}"` is a single character.
pub fn graphemes(word: &str) -> impl Iterator<Item = &str> {
    word.graphemes(true)
}

/// Number of user-perceived characters in `word`.
pub fn grapheme_count(word: &str) -> usize {
    graphemes(word).count()
}
