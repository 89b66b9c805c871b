//! Logical caret placement.
//!
//! Pixel or cell geometry belongs to the frontend; this module only answers *where* in the word
//! window the caret belongs after the latest event.

use crate::TypingState;

/// Caret location in the render window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaretSlot {
    /// Window position of the active word.
    pub word_position: usize,
    /// Letter index (render order) the caret sits in front of.
    pub char_position: usize,
    /// `true` when the active word has no untyped characters left; the caret sits after the last
    /// letter, in the gap before the next word.
    pub at_word_end: bool,
}

/// Where the caret belongs, or `None` once every word has been committed.
pub fn caret_slot(state: &TypingState) -> Option<CaretSlot> {
    let word_position = state.window().active_position()?;
    let word = state.active_word()?;

    Some(CaretSlot {
        word_position,
        char_position: word.typed_characters().len(),
        at_word_end: word.is_exhausted(),
    })
}
