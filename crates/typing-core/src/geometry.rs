//! Row geometry: which visual row each word of the render window sits on.
//!
//! The pruner only needs [`RowGeometryProvider::row_index`]. Frontends that measure their own
//! layout can feed rows through [`MeasuredRows`]; headless and terminal frontends can use
//! [`WrappedRowGeometry`], which wraps words into rows of a fixed cell width the same way a
//! flowing container of inline word boxes does.

use unicode_width::UnicodeWidthStr;

use crate::state::{WindowWord, WordWindow};

/// Reports the visual row of each word in the render window.
///
/// Rows are counted from the first row of the window (row `0`). Implementations must reflect the
/// current layout; callers invoke [`RowGeometryProvider::sync`] after every mutation that can
/// change it (a committed word, a pruned prefix) before querying rows again.
pub trait RowGeometryProvider {
    /// Recompute layout for the current window contents.
    fn sync(&mut self, window: WordWindow<'_>);

    /// Row of the word at window position `word_position`, if it is laid out.
    fn row_index(&self, word_position: usize) -> Option<usize>;
}

/// Rows supplied by an external layout (e.g. measured element offsets).
///
/// Rows are indexed by window position. When [`RowGeometryProvider::sync`] sees that the window
/// now starts at a later word (a prune archived a prefix), the archived entries are dropped and
/// the remaining rows are shifted so the new first word is on row `0`. Rows for newly appended
/// words, or a relayout after a resize, still have to come from [`MeasuredRows::set_rows`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeasuredRows {
    rows: Vec<usize>,
    /// Absolute index of the word at window position `0` when rows were last synced.
    first_absolute: isize,
}

impl MeasuredRows {
    /// Create from per-word rows in window order.
    pub fn new(rows: Vec<usize>) -> Self {
        Self {
            rows,
            first_absolute: 0,
        }
    }

    /// Replace the measured rows for the current window.
    pub fn set_rows(&mut self, rows: Vec<usize>) {
        self.rows = rows;
    }
}

impl RowGeometryProvider for MeasuredRows {
    fn sync(&mut self, window: WordWindow<'_>) {
        let Some(first) = window.get(0).map(|w| w.idx().absolute) else {
            return;
        };

        let dropped = usize::try_from(first - self.first_absolute).unwrap_or(0);
        if dropped > 0 {
            self.rows.drain(..dropped.min(self.rows.len()));
            if let Some(&top) = self.rows.first() {
                for row in &mut self.rows {
                    *row = row.saturating_sub(top);
                }
            }
        }
        self.first_absolute = first;
    }

    fn row_index(&self, word_position: usize) -> Option<usize> {
        self.rows.get(word_position).copied()
    }
}

/// Display width of a word in cells, extra characters included.
pub fn word_width(word: &WindowWord<'_>) -> usize {
    word.letters().map(|l| l.value().width()).sum()
}

/// Headless word-wrapping layout with one-cell gaps between words.
///
/// A word that does not fit on the current row moves to the next one intact. A word wider than
/// the whole row gets a row of its own. A width of `0` disables wrapping.
#[derive(Debug, Clone, Default)]
pub struct WrappedRowGeometry {
    width: usize,
    rows: Vec<usize>,
    /// Starting cell of each word within its row.
    columns: Vec<usize>,
}

impl WrappedRowGeometry {
    /// Create a layout for a container `width` cells wide.
    pub fn new(width: usize) -> Self {
        Self {
            width,
            rows: Vec::new(),
            columns: Vec::new(),
        }
    }

    /// Container width in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Change the container width. Takes effect on the next [`sync`](RowGeometryProvider::sync).
    pub fn set_width(&mut self, width: usize) {
        self.width = width;
    }

    /// Number of rows in the last layout.
    pub fn row_count(&self) -> usize {
        self.rows.last().map_or(0, |r| r + 1)
    }

    /// Starting cell of the word at `word_position` within its row.
    pub fn column(&self, word_position: usize) -> Option<usize> {
        self.columns.get(word_position).copied()
    }

    /// Window positions of the words laid out on `row`.
    pub fn words_on_row(&self, row: usize) -> std::ops::Range<usize> {
        let start = self.rows.partition_point(|&r| r < row);
        let end = self.rows.partition_point(|&r| r <= row);
        start..end
    }
}

impl RowGeometryProvider for WrappedRowGeometry {
    fn sync(&mut self, window: WordWindow<'_>) {
        self.rows.clear();
        self.columns.clear();

        let mut row = 0usize;
        let mut x = 0usize;
        for word in window.iter() {
            let w = word_width(&word);
            let start = if x == 0 { 0 } else { x + 1 };

            if self.width > 0 && x > 0 && start + w > self.width {
                row += 1;
                x = w;
                self.columns.push(0);
            } else {
                x = start + w;
                self.columns.push(start);
            }
            self.rows.push(row);
        }
    }

    fn row_index(&self, word_position: usize) -> Option<usize> {
        self.rows.get(word_position).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BehaviorPolicy, TypingState};

    #[test]
    fn test_wraps_whole_words() {
        let state = TypingState::new("aaa bbb ccc dddd e", BehaviorPolicy::default()).unwrap();
        let mut geometry = WrappedRowGeometry::new(8);
        geometry.sync(state.window());

        assert_eq!(
            (0..5).map(|i| geometry.row_index(i)).collect::<Vec<_>>(),
            vec![Some(0), Some(0), Some(1), Some(1), Some(2)]
        );
        assert_eq!(geometry.column(1), Some(4));
        assert_eq!(geometry.column(3), Some(4));
        assert_eq!(geometry.column(4), Some(0));
        assert_eq!(geometry.row_count(), 3);
        assert_eq!(geometry.words_on_row(1), 2..4);
        assert_eq!(geometry.row_index(5), None);
    }

    #[test]
    fn test_measured_rows_drop_archived_prefix() {
        let mut state = TypingState::new("ab cd ef gh", BehaviorPolicy::default()).unwrap();
        let mut geometry = MeasuredRows::new(vec![0, 0, 1, 2]);
        geometry.sync(state.window());
        assert_eq!(geometry.row_index(3), Some(2));

        state.start();
        for key in ["a", "b", " ", "c", "d", " "] {
            state.add_character(key).unwrap();
        }
        state.archive_committed(2).unwrap();
        geometry.sync(state.window());

        assert_eq!(geometry.row_index(0), Some(0));
        assert_eq!(geometry.row_index(1), Some(1));
        assert_eq!(geometry.row_index(2), None);

        // A second sync of the same window changes nothing.
        geometry.sync(state.window());
        assert_eq!(geometry.row_index(1), Some(1));
    }

    #[test]
    fn test_extras_widen_words() {
        let mut state = TypingState::new("ab cd", BehaviorPolicy::default()).unwrap();
        let mut geometry = WrappedRowGeometry::new(5);
        geometry.sync(state.window());
        assert_eq!(geometry.row_index(1), Some(0));

        state.start();
        for key in ["a", "b", "x"] {
            state.add_character(key).unwrap();
        }
        geometry.sync(state.window());
        assert_eq!(geometry.row_index(1), Some(1));
    }

    #[test]
    fn test_wide_characters_use_two_cells() {
        let state = TypingState::new("日本 語", BehaviorPolicy::default()).unwrap();
        let mut geometry = WrappedRowGeometry::new(6);
        geometry.sync(state.window());
        assert_eq!(geometry.row_index(1), Some(1));
    }

    #[test]
    fn test_zero_width_disables_wrapping() {
        let state = TypingState::new("a b c", BehaviorPolicy::default()).unwrap();
        let mut geometry = WrappedRowGeometry::new(0);
        geometry.sync(state.window());
        assert_eq!(geometry.row_count(), 1);
    }

    #[test]
    fn test_measured_rows() {
        let mut rows = MeasuredRows::new(vec![0, 0, 1]);
        assert_eq!(rows.row_index(2), Some(1));
        rows.set_rows(vec![0]);
        assert_eq!(rows.row_index(2), None);
    }
}
