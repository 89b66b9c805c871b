//! Line Window Pruner
//!
//! Keeps the render window bounded while typing through an unbounded text. After each committed
//! word, if the new active word has reached the trigger row (row `2` by default, i.e. a
//! three-row window), the first visible row is archived:
//!
//! 1. find the last committed word on row `0` whose successor is on row `1`;
//! 2. archive every committed word up to and including it;
//! 3. renumber relative word indices so the first remaining word is at relative `0`;
//! 4. renumber relative original-string character indices from `0`;
//! 5. fire [`TypingEvent::Pruned`] and re-sync the geometry.
//!
//! Steps 2–5 are applied by [`TypingState::archive_committed`]; the pruner decides *when* and
//! *how much*. The renumbering pass costs O(window) once per row transition, not per keystroke.

use crate::geometry::RowGeometryProvider;
use crate::state::{EventKind, TypingEvent, TypingState, WordWindow};
use crate::word::TypedWord;
use crate::TypingError;

/// Row the active word must reach before the first row is archived.
pub const DEFAULT_TRIGGER_ROW: usize = 2;

/// What a prune removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PruneReport {
    /// The archived words, in window order.
    pub archived: Vec<TypedWord>,
    /// Absolute position of the first word left in the window.
    pub first_absolute: isize,
}

/// Decides when committed rows have scrolled out and archives them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineWindowPruner {
    trigger_row: usize,
}

impl Default for LineWindowPruner {
    fn default() -> Self {
        Self::new()
    }
}

impl LineWindowPruner {
    /// Pruner for a three-row window.
    pub fn new() -> Self {
        Self {
            trigger_row: DEFAULT_TRIGGER_ROW,
        }
    }

    /// Pruner that waits until the active word reaches `trigger_row` (at least `2`).
    pub fn with_trigger_row(trigger_row: usize) -> Self {
        Self {
            trigger_row: trigger_row.max(DEFAULT_TRIGGER_ROW),
        }
    }

    /// Row the active word must reach before a prune.
    pub fn trigger_row(&self) -> usize {
        self.trigger_row
    }

    /// Window position of the last committed word on row `0` that is followed by a word on
    /// row `1`.
    pub fn find_boundary<G>(window: WordWindow<'_>, geometry: &G) -> Option<usize>
    where
        G: RowGeometryProvider + ?Sized,
    {
        (0..window.committed_len()).find(|&i| {
            geometry.row_index(i) == Some(0) && geometry.row_index(i + 1) == Some(1)
        })
    }

    /// React to a state event. Only [`EventKind::Next`] can trigger a prune.
    ///
    /// Inconsistent geometry is logged and skipped; the session keeps running.
    pub fn on_event<G>(
        &self,
        event: &TypingEvent,
        state: &mut TypingState,
        geometry: &mut G,
    ) -> Result<Option<PruneReport>, TypingError>
    where
        G: RowGeometryProvider + ?Sized,
    {
        if event.kind() != EventKind::Next {
            return Ok(None);
        }

        geometry.sync(state.window());

        let Some(active) = state.window().active_position() else {
            return Ok(None);
        };
        let Some(row) = geometry.row_index(active) else {
            tracing::warn!(active, "geometry has no row for the active word");
            return Ok(None);
        };
        if row < self.trigger_row {
            return Ok(None);
        }

        let Some(boundary) = Self::find_boundary(state.window(), geometry) else {
            tracing::warn!(active, row, "no row boundary among committed words");
            return Ok(None);
        };

        let archived = state.archive_committed(boundary + 1)?;
        geometry.sync(state.window());

        let first_absolute = state
            .window()
            .get(0)
            .map_or(-1, |word| word.idx().absolute);
        Ok(Some(PruneReport {
            archived,
            first_absolute,
        }))
    }
}
