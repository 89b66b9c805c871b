//! Typing State Machine
//!
//! [`TypingState`] owns two sequences:
//!
//! - `words`: pending words. The front is the *active word*, the one receiving keystrokes.
//! - `typed_words`: committed words, used as a stack (push on commit, pop on revert).
//!
//! Every mutation fires exactly one [`TypingEvent`] on the state's [`Observer`], after the
//! mutation has been applied. Consumers (renderer, caret, tests) get read-only projections; the
//! state machine is the only writer, including for the line window pruner, which goes through
//! [`TypingState::archive_committed`].
//!
//! # Example
//!
//! ```rust
//! use typing_core::{BehaviorPolicy, EventKind, KeyOutcome, TypingState};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let mut state = TypingState::new("cat dog", BehaviorPolicy::default()).unwrap();
//! let kinds = Rc::new(RefCell::new(Vec::new()));
//! let kinds_clone = kinds.clone();
//! let _subscription = state.subscribe(move |ev| kinds_clone.borrow_mut().push(ev.kind()));
//!
//! state.start();
//! for key in ["c", "a", "t", " "] {
//!     assert_eq!(state.add_character(key).unwrap(), KeyOutcome::Handled);
//! }
//!
//! assert_eq!(state.typed_words().len(), 1);
//! assert!(state.typed_words()[0].is_correct());
//! assert_eq!(
//!     *kinds.borrow(),
//!     vec![EventKind::Add, EventKind::Add, EventKind::Add, EventKind::Next]
//! );
//! ```

use std::collections::VecDeque;

use crate::error::resolve_index;
use crate::observer::{Observer, Subscription};
use crate::text;
use crate::word::{CharacterView, RevertMode, TypedCharacter, TypedWord, Word};
use crate::{BehaviorPolicy, ConfidenceMode, Position, TypingError};

/// Event type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A character was typed onto the active word.
    Add,
    /// A character was removed from the active word.
    Del,
    /// The last committed word was reverted and is active again.
    Prev,
    /// The active word was committed.
    Next,
    /// Committed words were archived and relative indices renumbered.
    Pruned,
    /// Words were appended to the pending queue.
    Appended,
}

/// A state change, carrying read-only copies of the affected entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypingEvent {
    /// A character was typed onto the active word.
    Add {
        /// Position of the active word.
        word: Position,
        /// The character as it was committed.
        character: TypedCharacter,
    },
    /// The last typed character of the active word was removed.
    Del {
        /// Position of the active word.
        word: Position,
        /// The removed character.
        character: TypedCharacter,
    },
    /// The last committed word was reverted.
    Prev {
        /// Position of the reverted (now active) word.
        word: Position,
    },
    /// The active word was committed.
    Next {
        /// Position of the committed word.
        committed: Position,
        /// Whether the committed word is correct.
        is_correct: bool,
        /// Position of the new active word, if any is left.
        active: Option<Position>,
    },
    /// Committed words scrolled out of the window were archived.
    Pruned {
        /// Number of words removed from the front of the window.
        archived: usize,
        /// Absolute position of the first word still in the window.
        first_absolute: isize,
    },
    /// Words were appended to the pending queue.
    Appended {
        /// Position of the first appended word.
        first: Position,
        /// Number of appended words.
        count: usize,
    },
}

impl TypingEvent {
    /// The event's type tag.
    pub fn kind(&self) -> EventKind {
        match self {
            TypingEvent::Add { .. } => EventKind::Add,
            TypingEvent::Del { .. } => EventKind::Del,
            TypingEvent::Prev { .. } => EventKind::Prev,
            TypingEvent::Next { .. } => EventKind::Next,
            TypingEvent::Pruned { .. } => EventKind::Pruned,
            TypingEvent::Appended { .. } => EventKind::Appended,
        }
    }
}

/// Result of feeding one input to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The input mutated state and an event was fired.
    Handled,
    /// The input was rejected as a no-op; the caller should suppress its default action.
    Suppressed,
    /// The input completed the text (eager finish).
    Finished,
}

/// A word in the render window: committed words first, then pending words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowWord<'a> {
    /// Already committed.
    Committed(&'a TypedWord),
    /// Active or still pending.
    Pending(&'a Word),
}

impl<'a> WindowWord<'a> {
    /// Position of the word.
    pub fn idx(&self) -> Position {
        match self {
            WindowWord::Committed(w) => w.idx(),
            WindowWord::Pending(w) => w.idx(),
        }
    }

    /// Letters in render order.
    pub fn letters(&self) -> Box<dyn Iterator<Item = CharacterView<'a>> + 'a> {
        match *self {
            WindowWord::Committed(w) => Box::new(w.letters()),
            WindowWord::Pending(w) => Box::new(w.letters()),
        }
    }
}

/// Read-only view of the render window.
#[derive(Debug, Clone, Copy)]
pub struct WordWindow<'a> {
    typed: &'a [TypedWord],
    pending: &'a VecDeque<Word>,
}

impl<'a> WordWindow<'a> {
    /// Number of words in the window.
    pub fn len(&self) -> usize {
        self.typed.len() + self.pending.len()
    }

    /// Returns `true` if the window holds no words.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of committed words in the window.
    pub fn committed_len(&self) -> usize {
        self.typed.len()
    }

    /// Window position of the active word.
    pub fn active_position(&self) -> Option<usize> {
        (!self.pending.is_empty()).then_some(self.typed.len())
    }

    /// The word at window position `position`.
    pub fn get(&self, position: usize) -> Option<WindowWord<'a>> {
        match position.checked_sub(self.typed.len()) {
            None => self.typed.get(position).map(WindowWord::Committed),
            Some(i) => self.pending.get(i).map(WindowWord::Pending),
        }
    }

    /// Words in render order.
    pub fn iter(&self) -> impl Iterator<Item = WindowWord<'a>> + 'a {
        self.typed
            .iter()
            .map(WindowWord::Committed)
            .chain(self.pending.iter().map(WindowWord::Pending))
    }
}

/// The typing state machine.
#[derive(Debug)]
pub struct TypingState {
    original_string: String,
    policy: BehaviorPolicy,
    events: Observer<TypingEvent>,
    words: VecDeque<Word>,
    typed_words: Vec<TypedWord>,
    has_started: bool,
    archived_count: usize,
    /// Position the next appended word will get.
    next_word: Position,
    /// Original-string position of the next appended word's first character.
    next_char: Position,
}

impl TypingState {
    /// Create a state for `text`.
    ///
    /// Fails with [`TypingError::EmptyInput`] if `text` is empty or whitespace-only.
    pub fn new(text: &str, policy: BehaviorPolicy) -> Result<Self, TypingError> {
        let tokens = text::tokenize(text)?;

        let mut state = Self {
            original_string: tokens.join(" "),
            policy,
            events: Observer::new(),
            words: VecDeque::with_capacity(tokens.len()),
            typed_words: Vec::new(),
            has_started: false,
            archived_count: 0,
            next_word: Position::at(0),
            next_char: Position::at(0),
        };
        for token in tokens {
            state.push_word(token);
        }
        Ok(state)
    }

    fn push_word(&mut self, source: &str) {
        let word = Word::new(source, self.next_word, self.next_char);
        // +1 for the single space between words
        self.next_char = self
            .next_char
            .shifted(word.character_count() as isize + 1);
        self.next_word = self.next_word.shifted(1);
        self.words.push_back(word);
    }

    /// Mark the session as started. Input operations fail with
    /// [`TypingError::NotStarted`] until this is called.
    pub fn start(&mut self) {
        self.has_started = true;
    }

    /// Mark the session as stopped.
    pub fn stop(&mut self) {
        self.has_started = false;
    }

    /// Whether the session has been started.
    pub fn has_started(&self) -> bool {
        self.has_started
    }

    /// The current behavior policy.
    pub fn policy(&self) -> &BehaviorPolicy {
        &self.policy
    }

    /// Replace the behavior policy. Takes effect on the next operation.
    pub fn set_policy(&mut self, policy: BehaviorPolicy) {
        self.policy = policy;
    }

    /// The notification bus. Clone it to subscribe from elsewhere.
    pub fn events(&self) -> &Observer<TypingEvent> {
        &self.events
    }

    /// Shorthand for `self.events().subscribe(handler)`.
    pub fn subscribe<F>(&self, handler: F) -> Subscription<TypingEvent>
    where
        F: FnMut(&TypingEvent) + 'static,
    {
        self.events.subscribe(handler)
    }

    /// The normalized target text (words joined by single spaces).
    pub fn original_string(&self) -> &str {
        &self.original_string
    }

    /// Pending words; the front is the active word.
    pub fn words(&self) -> &VecDeque<Word> {
        &self.words
    }

    /// Committed words still in the render window.
    pub fn typed_words(&self) -> &[TypedWord] {
        &self.typed_words
    }

    /// The word currently being typed.
    pub fn active_word(&self) -> Option<&Word> {
        self.words.front()
    }

    /// Pending word at `index`; negative indices count from the end.
    pub fn word_at(&self, index: isize) -> Result<&Word, TypingError> {
        let i = resolve_index(index, self.words.len())?;
        Ok(&self.words[i])
    }

    /// Committed word at `index`; negative indices count from the end.
    pub fn typed_word_at(&self, index: isize) -> Result<&TypedWord, TypingError> {
        let i = resolve_index(index, self.typed_words.len())?;
        Ok(&self.typed_words[i])
    }

    /// Read-only view of the render window.
    pub fn window(&self) -> WordWindow<'_> {
        WordWindow {
            typed: &self.typed_words,
            pending: &self.words,
        }
    }

    /// Number of committed words archived by pruning so far.
    pub fn archived_count(&self) -> usize {
        self.archived_count
    }

    /// `true` when no pending word is left.
    pub fn is_exhausted(&self) -> bool {
        self.words.is_empty()
    }

    fn revert_mode(&self) -> RevertMode {
        if self.policy.strict_space {
            RevertMode::Verbatim
        } else {
            RevertMode::RestoreSkipped
        }
    }

    /// Feed one pressed key (a single grapheme, space included).
    pub fn add_character(&mut self, key: &str) -> Result<KeyOutcome, TypingError> {
        if !self.has_started {
            return Err(TypingError::NotStarted);
        }
        if text::grapheme_count(key) != 1 {
            tracing::debug!(key, "ignoring key that is not a single grapheme");
            return Ok(KeyOutcome::Suppressed);
        }

        let strict_space = self.policy.strict_space;
        let Some(active) = self.words.front_mut() else {
            tracing::debug!(key, "all words have been typed");
            return Ok(KeyOutcome::Suppressed);
        };

        if key == " " {
            if !strict_space {
                if !active.has_typed() {
                    tracing::debug!("leading space rejected");
                    return Ok(KeyOutcome::Suppressed);
                }
                let skipped = active.skip_remaining();
                if skipped > 0 {
                    tracing::debug!(skipped, word = ?active.idx(), "skipping rest of word");
                }
                self.commit_active()?;
                return Ok(KeyOutcome::Handled);
            }
            if active.is_exhausted() {
                self.commit_active()?;
                return Ok(KeyOutcome::Handled);
            }
        }

        let word = active.idx();
        let character = active.push_key(key).clone();
        self.events.notify(&TypingEvent::Add { word, character });

        if self.policy.eager_finish
            && self.words.len() == 1
            && self
                .words
                .front()
                .is_some_and(|w| w.is_exhausted() && w.is_correct_so_far())
        {
            self.commit_active()?;
            return Ok(KeyOutcome::Finished);
        }

        Ok(KeyOutcome::Handled)
    }

    /// Delete the last typed character, or step back into the previous word.
    pub fn backspace(&mut self) -> Result<KeyOutcome, TypingError> {
        if !self.has_started {
            return Err(TypingError::NotStarted);
        }
        if self.policy.confidence_mode == ConfidenceMode::Max {
            return Ok(KeyOutcome::Suppressed);
        }

        let Some(active) = self.words.front_mut() else {
            tracing::debug!("backspace after the last word was committed");
            return Ok(KeyOutcome::Suppressed);
        };

        if active.has_typed() {
            let word = active.idx();
            let Some(character) = active.pop_typed() else {
                return Ok(KeyOutcome::Suppressed);
            };
            self.events.notify(&TypingEvent::Del { word, character });
            return Ok(KeyOutcome::Handled);
        }

        let Some(last) = self.typed_words.last() else {
            return Ok(KeyOutcome::Suppressed);
        };
        if self.policy.confidence_mode == ConfidenceMode::On && last.is_correct() {
            return Ok(KeyOutcome::Suppressed);
        }

        let mode = self.revert_mode();
        let Some(typed) = self.typed_words.pop() else {
            return Ok(KeyOutcome::Suppressed);
        };
        let word = typed.revert(mode);
        let idx = word.idx();
        self.words.push_front(word);
        self.events.notify(&TypingEvent::Prev { word: idx });

        Ok(KeyOutcome::Handled)
    }

    /// Append more text to type, continuing the index sequences.
    ///
    /// Fails with [`TypingError::IndexUnderflow`] if the state holds no word at all, and with
    /// [`TypingError::EmptyInput`] if `text` is blank.
    pub fn add_to_string(&mut self, text: &str) -> Result<(), TypingError> {
        if self.words.is_empty() && self.typed_words.is_empty() {
            return Err(TypingError::IndexUnderflow { index: -1, len: 0 });
        }
        let tokens = text::tokenize(text)?;

        let first = self.next_word;
        for token in &tokens {
            self.push_word(token);
        }
        if !self.original_string.is_empty() {
            self.original_string.push(' ');
        }
        self.original_string.push_str(&tokens.join(" "));

        self.events.notify(&TypingEvent::Appended {
            first,
            count: tokens.len(),
        });
        Ok(())
    }

    /// Permanently remove the first `count` committed words from the window and renumber the
    /// relative indices of everything that remains.
    ///
    /// Fires [`TypingEvent::Pruned`] and returns the archived words.
    pub fn archive_committed(&mut self, count: usize) -> Result<Vec<TypedWord>, TypingError> {
        if count == 0 || count > self.typed_words.len() {
            return Err(TypingError::IndexUnderflow {
                index: count as isize - 1,
                len: self.typed_words.len(),
            });
        }

        let archived: Vec<TypedWord> = self.typed_words.drain(..count).collect();
        self.archived_count += count;
        self.renumber();

        let first_absolute = self
            .window()
            .get(0)
            .map(|w| w.idx().absolute)
            .unwrap_or(self.next_word.absolute);
        tracing::debug!(archived = count, first_absolute, "pruned committed words");
        self.events.notify(&TypingEvent::Pruned {
            archived: count,
            first_absolute,
        });

        Ok(archived)
    }

    fn renumber(&mut self) {
        let committed = self.typed_words.len();
        for (i, word) in self.typed_words.iter_mut().enumerate() {
            word.set_relative(i as isize);
        }
        for (i, word) in self.words.iter_mut().enumerate() {
            word.set_relative((committed + i) as isize);
        }

        let mut cursor = 0;
        for word in &mut self.typed_words {
            word.renumber_original(&mut cursor);
        }
        for word in &mut self.words {
            word.renumber_original(&mut cursor);
        }

        self.next_word = self
            .next_word
            .with_relative((committed + self.words.len()) as isize);
        self.next_char = self.next_char.with_relative(cursor);
    }

    fn commit_active(&mut self) -> Result<(), TypingError> {
        let remaining = self.words.front().map_or(0, |w| w.characters().len());
        if remaining != 0 {
            return Err(TypingError::IncompleteWord { remaining });
        }
        let word = self
            .words
            .pop_front()
            .ok_or(TypingError::IndexUnderflow { index: 0, len: 0 })?;

        let typed = TypedWord::try_from(word)?;
        let committed = typed.idx();
        let is_correct = typed.is_correct();
        self.typed_words.push(typed);

        self.events.notify(&TypingEvent::Next {
            committed,
            is_correct,
            active: self.words.front().map(Word::idx),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn started(text: &str, policy: BehaviorPolicy) -> TypingState {
        let mut state = TypingState::new(text, policy).unwrap();
        state.start();
        state
    }

    fn type_keys(state: &mut TypingState, keys: &str) {
        for key in text::graphemes(keys) {
            state.add_character(key).unwrap();
        }
    }

    fn record(state: &TypingState) -> Rc<RefCell<Vec<TypingEvent>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_clone = log.clone();
        let _ = state.subscribe(move |ev| log_clone.borrow_mut().push(ev.clone()));
        log
    }

    #[test]
    fn test_new_rejects_blank_text() {
        assert_eq!(
            TypingState::new("   ", BehaviorPolicy::default()).unwrap_err(),
            TypingError::EmptyInput
        );
    }

    #[test]
    fn test_indices_on_construction() {
        let state = TypingState::new("  cat   dog ", BehaviorPolicy::default()).unwrap();
        assert_eq!(state.original_string(), "cat dog");
        assert_eq!(state.words()[1].idx(), Position::at(1));
        assert_eq!(
            state.words()[1].characters()[0].original_idx,
            Position::at(4)
        );
    }

    #[test]
    fn test_operations_require_start() {
        let mut state = TypingState::new("cat", BehaviorPolicy::default()).unwrap();
        assert_eq!(state.backspace(), Err(TypingError::NotStarted));
        assert_eq!(state.add_character("c"), Err(TypingError::NotStarted));
    }

    #[test]
    fn test_leading_space_is_suppressed_without_strict_space() {
        let mut state = started("cat dog", BehaviorPolicy::default().with_strict_space(false));
        let log = record(&state);

        assert_eq!(state.add_character(" ").unwrap(), KeyOutcome::Suppressed);
        assert!(log.borrow().is_empty());
        assert!(state.typed_words().is_empty());
    }

    #[test]
    fn test_space_skips_rest_of_word() {
        let mut state = started("cat dog", BehaviorPolicy::default().with_strict_space(false));
        type_keys(&mut state, "c ");

        let committed = &state.typed_words()[0];
        assert!(!committed.is_correct());
        let typed: Vec<&str> = committed
            .typed_characters()
            .iter()
            .map(|c| c.typed_value.as_str())
            .collect();
        assert_eq!(typed, vec!["c", " ", " "]);
        assert_eq!(state.active_word().unwrap().source(), "dog");
    }

    #[test]
    fn test_strict_space_is_literal_mid_word() {
        let mut state = started("cat dog", BehaviorPolicy::default());
        type_keys(&mut state, "c ");

        let active = state.active_word().unwrap();
        assert_eq!(active.idx(), Position::at(0));
        assert_eq!(active.typed_characters()[1].typed_value, " ");
        assert!(!active.typed_characters()[1].is_correct());
        assert!(!active.typed_characters()[1].is_extra);
    }

    #[test]
    fn test_strict_space_advances_at_word_end() {
        let mut state = started("cat dog", BehaviorPolicy::default());
        let log = record(&state);
        type_keys(&mut state, "cat ");

        assert_eq!(state.typed_words().len(), 1);
        assert_eq!(
            log.borrow().last(),
            Some(&TypingEvent::Next {
                committed: Position::at(0),
                is_correct: true,
                active: Some(Position::at(1)),
            })
        );
    }

    #[test]
    fn test_strict_space_after_extras_advances() {
        let mut state = started("cat dog", BehaviorPolicy::default());
        type_keys(&mut state, "cats ");
        assert_eq!(state.typed_words().len(), 1);
        assert!(!state.typed_words()[0].is_correct());
    }

    #[test]
    fn test_backspace_removes_last_character() {
        let mut state = started("cat", BehaviorPolicy::default());
        let log = record(&state);
        type_keys(&mut state, "cx");
        assert_eq!(state.backspace().unwrap(), KeyOutcome::Handled);

        let active = state.active_word().unwrap();
        assert_eq!(active.typed_characters().len(), 1);
        assert_eq!(active.characters().front().unwrap().value, "a");
        assert_eq!(log.borrow().last().unwrap().kind(), EventKind::Del);
        assert!(active.is_consistent());
    }

    #[test]
    fn test_backspace_at_first_word_is_noop() {
        let mut state = started("cat dog", BehaviorPolicy::default().with_confidence_mode(ConfidenceMode::Off));
        let log = record(&state);

        assert_eq!(state.backspace().unwrap(), KeyOutcome::Suppressed);
        assert!(log.borrow().is_empty());
        assert_eq!(state.words().len(), 2);
        assert!(state.typed_words().is_empty());
    }

    #[test]
    fn test_confidence_on_locks_correct_words() {
        let mut state = started("cat dog", BehaviorPolicy::default());
        type_keys(&mut state, "cat ");
        assert_eq!(state.backspace().unwrap(), KeyOutcome::Suppressed);
        assert_eq!(state.typed_words().len(), 1);

        let mut state = started("cat dog", BehaviorPolicy::default());
        type_keys(&mut state, "cot ");
        assert_eq!(state.backspace().unwrap(), KeyOutcome::Handled);
        assert!(state.typed_words().is_empty());
        assert_eq!(state.active_word().unwrap().typed_characters().len(), 3);
    }

    #[test]
    fn test_confidence_max_disables_backspace() {
        let mut state = started(
            "cat dog",
            BehaviorPolicy::default().with_confidence_mode(ConfidenceMode::Max),
        );
        type_keys(&mut state, "cx");
        let before = state.active_word().unwrap().clone();

        assert_eq!(state.backspace().unwrap(), KeyOutcome::Suppressed);
        assert_eq!(state.active_word().unwrap(), &before);
    }

    #[test]
    fn test_revert_restores_skipped_characters() {
        let mut state = started(
            "cat dog",
            BehaviorPolicy::default()
                .with_strict_space(false)
                .with_confidence_mode(ConfidenceMode::Off),
        );
        type_keys(&mut state, "c ");
        assert_eq!(state.backspace().unwrap(), KeyOutcome::Handled);

        let active = state.active_word().unwrap();
        assert_eq!(active.typed_characters().len(), 1);
        let pending: Vec<&str> = active.characters().iter().map(|c| c.value.as_str()).collect();
        assert_eq!(pending, vec!["a", "t"]);
    }

    #[test]
    fn test_revert_after_policy_change_keeps_character_order() {
        let mut state = started(
            "cat dog",
            BehaviorPolicy::default().with_confidence_mode(ConfidenceMode::Off),
        );
        type_keys(&mut state, "c t ");
        state.set_policy(state.policy().with_strict_space(false));

        assert_eq!(state.backspace().unwrap(), KeyOutcome::Handled);
        let active = state.active_word().unwrap();
        assert!(active.is_exhausted());

        assert_eq!(state.add_character("a").unwrap(), KeyOutcome::Handled);
        let active = state.active_word().unwrap();
        let typed: Vec<(&str, isize)> = active
            .typed_characters()
            .iter()
            .map(|c| (c.typed_value.as_str(), c.idx.absolute))
            .collect();
        assert_eq!(typed, vec![("c", 0), (" ", 1), ("t", 2), ("a", 3)]);
        assert!(active.typed_characters()[3].is_extra);
    }

    #[test]
    fn test_multi_grapheme_keys_are_suppressed() {
        let mut state = started("cat", BehaviorPolicy::default());
        let log = record(&state);

        for key in ["", "ca", "e\u{301}x"] {
            assert_eq!(state.add_character(key).unwrap(), KeyOutcome::Suppressed);
        }
        assert!(log.borrow().is_empty());
        assert!(!state.active_word().unwrap().has_typed());

        let mut state = started("cafe\u{301}", BehaviorPolicy::default());
        type_keys(&mut state, "caf");
        assert_eq!(state.add_character("e\u{301}").unwrap(), KeyOutcome::Handled);
        assert!(state.active_word().unwrap().is_correct_so_far());
        assert!(state.active_word().unwrap().is_exhausted());
    }

    #[test]
    fn test_eager_finish_commits_last_word() {
        let mut state = started("cat dog", BehaviorPolicy::default().with_eager_finish(true));
        type_keys(&mut state, "cat do");
        assert_eq!(state.add_character("g").unwrap(), KeyOutcome::Finished);
        assert!(state.is_exhausted());
        assert_eq!(state.typed_words().len(), 2);
        assert_eq!(state.add_character("x").unwrap(), KeyOutcome::Suppressed);
        assert_eq!(state.backspace().unwrap(), KeyOutcome::Suppressed);
    }

    #[test]
    fn test_eager_finish_waits_for_correct_word() {
        let mut state = started("cat", BehaviorPolicy::default().with_eager_finish(true));
        type_keys(&mut state, "ca");
        assert_eq!(state.add_character("x").unwrap(), KeyOutcome::Handled);
        assert!(!state.is_exhausted());
    }

    #[test]
    fn test_add_to_string_continues_indices() {
        let mut state = started("cat dog", BehaviorPolicy::default());
        let log = record(&state);
        state.add_to_string("  emu ").unwrap();

        assert_eq!(state.original_string(), "cat dog emu");
        let emu = state.word_at(-1).unwrap();
        assert_eq!(emu.idx(), Position::at(2));
        assert_eq!(emu.characters()[0].original_idx, Position::at(8));
        assert_eq!(
            log.borrow().as_slice(),
            &[TypingEvent::Appended {
                first: Position::at(2),
                count: 1
            }]
        );
        assert_eq!(state.add_to_string(" "), Err(TypingError::EmptyInput));
    }

    #[test]
    fn test_add_to_string_revives_exhausted_state() {
        let mut state = started("cat", BehaviorPolicy::default());
        type_keys(&mut state, "cat ");
        assert!(state.is_exhausted());

        state.add_to_string("dog").unwrap();
        assert!(!state.is_exhausted());
        type_keys(&mut state, "dog ");
        assert_eq!(state.typed_words().len(), 2);
        assert!(state.typed_words().iter().all(TypedWord::is_correct));
    }

    #[test]
    fn test_word_at_negative_out_of_range() {
        let state = TypingState::new("cat", BehaviorPolicy::default()).unwrap();
        assert_eq!(state.word_at(-1).unwrap().source(), "cat");
        assert_eq!(
            state.typed_word_at(-1).unwrap_err(),
            TypingError::IndexUnderflow { index: -1, len: 0 }
        );
    }

    #[test]
    fn test_archive_committed_renumbers() {
        let mut state = started("ab cd ef gh", BehaviorPolicy::default());
        type_keys(&mut state, "ab cd ef ");
        let log = record(&state);

        let archived = state.archive_committed(2).unwrap();
        assert_eq!(archived.len(), 2);
        assert_eq!(state.archived_count(), 2);

        assert_eq!(state.typed_words()[0].idx(), Position::new(2, 0));
        assert_eq!(state.words()[0].idx(), Position::new(3, 1));
        assert_eq!(
            state.typed_words()[0].typed_characters()[0].original_idx,
            Position::new(6, 0)
        );
        assert_eq!(
            state.words()[0].characters()[0].original_idx,
            Position::new(9, 3)
        );
        assert_eq!(
            log.borrow().as_slice(),
            &[TypingEvent::Pruned {
                archived: 2,
                first_absolute: 2
            }]
        );

        state.add_to_string("ij").unwrap();
        assert_eq!(state.words()[1].idx(), Position::new(4, 2));
        assert_eq!(
            state.words()[1].characters()[0].original_idx,
            Position::new(12, 6)
        );
    }

    #[test]
    fn test_archive_committed_bounds() {
        let mut state = started("ab cd", BehaviorPolicy::default());
        type_keys(&mut state, "ab ");
        assert!(state.archive_committed(0).is_err());
        assert!(state.archive_committed(2).is_err());
        assert_eq!(state.typed_words().len(), 1);
    }

    #[test]
    fn test_window_view() {
        let mut state = started("ab cd ef", BehaviorPolicy::default());
        type_keys(&mut state, "ab ");
        let window = state.window();
        assert_eq!(window.len(), 3);
        assert_eq!(window.active_position(), Some(1));
        assert!(matches!(window.get(0), Some(WindowWord::Committed(_))));
        assert!(matches!(window.get(2), Some(WindowWord::Pending(_))));
        assert!(window.get(3).is_none());
        let letters: String = window.get(1).unwrap().letters().map(|l| l.value()).collect();
        assert_eq!(letters, "cd");
    }
}
