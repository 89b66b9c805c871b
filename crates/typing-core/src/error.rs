use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors produced by the typing engine.
///
/// Recoverable input conditions (a leading space, backspace on the first word, backspace into a
/// locked word) are not errors; they are reported as
/// [`KeyOutcome::Suppressed`](crate::KeyOutcome::Suppressed).
pub enum TypingError {
    #[error("text to type cannot be empty")]
    /// The source string is empty or whitespace-only.
    EmptyInput,

    #[error("the typing session has not been started yet")]
    /// An input operation was attempted before the owner called `start()`.
    NotStarted,

    #[error("word still has {remaining} characters to be typed")]
    /// A word was committed while its pending queue was non-empty.
    ///
    /// This is an internal invariant guard on the commit path; seeing it means an upstream
    /// sequencing bug.
    IncompleteWord {
        /// Characters still left in the pending queue.
        remaining: usize,
    },

    #[error("index {index} out of bounds for sequence of length {len}")]
    /// A lookup resolved to a negative or out-of-range index.
    IndexUnderflow {
        /// The requested index (negative values count from the end).
        index: isize,
        /// Length of the sequence at lookup time.
        len: usize,
    },

    #[error("invalid behavior policy: {0}")]
    /// A behavior policy could not be parsed.
    Config(String),
}

/// Resolve `index` against a sequence of length `len`, counting negative indices from the end.
pub(crate) fn resolve_index(index: isize, len: usize) -> Result<usize, TypingError> {
    let resolved = if index < 0 {
        len.checked_sub(index.unsigned_abs())
    } else {
        Some(index.unsigned_abs())
    };

    match resolved {
        Some(i) if i < len => Ok(i),
        _ => Err(TypingError::IndexUnderflow { index, len }),
    }
}
