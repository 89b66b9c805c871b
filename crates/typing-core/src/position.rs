//! Absolute / relative index pairs.
//!
//! Every character and word carries a [`Position`]:
//!
//! - `absolute` is a lifetime coordinate. It is assigned once when the entity is materialized and
//!   never renumbered.
//! - `relative` is a render-window coordinate. The line window pruner rewrites it whenever rows
//!   scroll out of view, so that relative index `0` always anchors the first visible row.
//!
//! Both fields are signed: a negative value means "shifted out of the window" (or, for
//! [`Position::UNSET`], "has no source counterpart") and must not be used as an index.

/// An `{absolute, relative}` index pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    /// Lifetime coordinate (write-once).
    pub absolute: isize,
    /// Current render-window coordinate.
    pub relative: isize,
}

impl Position {
    /// Marker for characters that do not exist in the source text (extra characters).
    pub const UNSET: Position = Position {
        absolute: -1,
        relative: -1,
    };

    /// Create a position.
    pub const fn new(absolute: isize, relative: isize) -> Self {
        Self { absolute, relative }
    }

    /// Create a position whose relative and absolute coordinates coincide.
    pub const fn at(index: isize) -> Self {
        Self::new(index, index)
    }

    /// Move both coordinates by `delta`.
    pub const fn shifted(self, delta: isize) -> Self {
        Self::new(self.absolute + delta, self.relative + delta)
    }

    /// Keep `absolute`, replace `relative`.
    pub const fn with_relative(self, relative: isize) -> Self {
        Self::new(self.absolute, relative)
    }

    /// Returns `true` if this is [`Position::UNSET`].
    pub const fn is_unset(&self) -> bool {
        self.absolute < 0 && self.relative < 0
    }

    /// Returns `true` if the relative coordinate currently lies outside the window.
    pub const fn is_shifted_out(&self) -> bool {
        self.relative < 0
    }

    /// The relative coordinate as a window index, if it is inside the window.
    pub fn relative_index(&self) -> Option<usize> {
        usize::try_from(self.relative).ok()
    }

    /// The absolute coordinate as an index, if it is set.
    pub fn absolute_index(&self) -> Option<usize> {
        usize::try_from(self.absolute).ok()
    }
}
