//! Entity model: characters and words, before and after they are typed.
//!
//! A [`Word`] starts with all of its [`Character`]s in a pending queue. Each keystroke moves the
//! front character into the word's typed list as a [`TypedCharacter`] (or appends an extra one
//! once the queue is empty). When the queue is empty the word can be committed into a
//! [`TypedWord`]; [`TypedWord::revert`] is the inverse transform used by backspace.

use std::collections::VecDeque;

use crate::text;
use crate::{Position, TypingError};

/// Value stored in [`TypedCharacter::typed_value`] for characters that were never keyed because
/// the word was force-advanced with space.
pub const SKIP_SENTINEL: &str = " ";

/// One unit of target text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Character {
    /// Position within the containing word.
    pub idx: Position,
    /// Position within the whole original string.
    pub original_idx: Position,
    /// The grapheme to type.
    pub value: String,
}

/// A character together with what the user actually typed for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedCharacter {
    /// Position within the containing word.
    pub idx: Position,
    /// Position within the whole original string ([`Position::UNSET`] for extras).
    pub original_idx: Position,
    /// The expected grapheme. For extras this is the typed key itself.
    pub value: String,
    /// `true` if this keystroke went past the word's original length.
    pub is_extra: bool,
    /// The key the user pressed.
    pub typed_value: String,
}

impl TypedCharacter {
    /// A source character typed with `key`.
    pub fn typed(character: Character, key: &str) -> Self {
        Self {
            idx: character.idx,
            original_idx: character.original_idx,
            value: character.value,
            is_extra: false,
            typed_value: key.to_string(),
        }
    }

    /// A source character force-committed without being keyed.
    pub fn skipped(character: Character) -> Self {
        Self::typed(character, SKIP_SENTINEL)
    }

    /// A keystroke with no source counterpart.
    pub fn extra(idx: Position, key: &str) -> Self {
        Self {
            idx,
            original_idx: Position::UNSET,
            value: key.to_string(),
            is_extra: true,
            typed_value: key.to_string(),
        }
    }

    /// `true` if the keystroke matched its source character.
    pub fn is_correct(&self) -> bool {
        !self.is_extra && self.value == self.typed_value
    }

    /// `true` if this source character was never keyed (the word was skipped past it).
    pub fn is_skipped(&self) -> bool {
        !self.is_extra && self.typed_value == SKIP_SENTINEL && self.value != SKIP_SENTINEL
    }
}

impl From<TypedCharacter> for Character {
    fn from(typed: TypedCharacter) -> Self {
        Character {
            idx: typed.idx,
            original_idx: typed.original_idx,
            value: typed.value,
        }
    }
}

/// A letter of a word in render order, tagged by which container it lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterView<'a> {
    /// Not typed yet.
    Pending(&'a Character),
    /// Already typed (possibly extra or skipped).
    Typed(&'a TypedCharacter),
}

impl<'a> CharacterView<'a> {
    /// The grapheme displayed for this letter.
    pub fn value(&self) -> &'a str {
        match self {
            CharacterView::Pending(c) => &c.value,
            CharacterView::Typed(c) => &c.value,
        }
    }

    /// Position within the word.
    pub fn idx(&self) -> Position {
        match self {
            CharacterView::Pending(c) => c.idx,
            CharacterView::Typed(c) => c.idx,
        }
    }

    /// Position within the original string.
    pub fn original_idx(&self) -> Position {
        match self {
            CharacterView::Pending(c) => c.original_idx,
            CharacterView::Typed(c) => c.original_idx,
        }
    }

    /// The typed character, if this letter has been typed.
    pub fn as_typed(&self) -> Option<&'a TypedCharacter> {
        match self {
            CharacterView::Pending(_) => None,
            CharacterView::Typed(c) => Some(c),
        }
    }
}

/// How [`TypedWord::revert`] treats characters that were skipped with space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevertMode {
    /// Skipped characters go back into the pending queue; everything else stays typed.
    RestoreSkipped,
    /// The typed list is restored character for character.
    Verbatim,
}

/// Renumber `original_idx.relative` of every non-extra character, walking from `cursor`.
///
/// Advances `cursor` by one per character plus one for the trailing inter-word gap.
fn renumber_original<'a>(
    typed: impl Iterator<Item = &'a mut TypedCharacter>,
    pending: impl Iterator<Item = &'a mut Character>,
    cursor: &mut isize,
) {
    for c in typed {
        if c.is_extra {
            c.original_idx = Position::UNSET;
            continue;
        }
        c.original_idx = c.original_idx.with_relative(*cursor);
        *cursor += 1;
    }
    for c in pending {
        c.original_idx = c.original_idx.with_relative(*cursor);
        *cursor += 1;
    }
    *cursor += 1;
}

/// A word that is pending or currently being typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    character_count: usize,
    idx: Position,
    characters: VecDeque<Character>,
    typed_characters: Vec<TypedCharacter>,
}

impl Word {
    /// Materialize a word from its source text.
    ///
    /// `idx` is the word's position; `first_char` is the original-string position of its first
    /// character.
    pub fn new(source: &str, idx: Position, first_char: Position) -> Self {
        let characters: VecDeque<Character> = text::graphemes(source)
            .enumerate()
            .map(|(j, value)| {
                let j = j as isize;
                Character {
                    idx: Position::at(j),
                    original_idx: first_char.shifted(j),
                    value: value.to_string(),
                }
            })
            .collect();

        Self {
            character_count: characters.len(),
            idx,
            characters,
            typed_characters: Vec::new(),
        }
    }

    /// Original length of the word (extras excluded).
    pub fn character_count(&self) -> usize {
        self.character_count
    }

    /// Position of the word.
    pub fn idx(&self) -> Position {
        self.idx
    }

    /// Untyped remainder, front = next to type.
    pub fn characters(&self) -> &VecDeque<Character> {
        &self.characters
    }

    /// Characters typed so far, in order.
    pub fn typed_characters(&self) -> &[TypedCharacter] {
        &self.typed_characters
    }

    /// `true` if every source character has been typed (extras may still follow).
    pub fn is_exhausted(&self) -> bool {
        self.characters.is_empty()
    }

    /// `true` if at least one character has been typed.
    pub fn has_typed(&self) -> bool {
        !self.typed_characters.is_empty()
    }

    /// Letters in render order: typed first, then pending.
    pub fn letters(&self) -> impl Iterator<Item = CharacterView<'_>> {
        self.typed_characters
            .iter()
            .map(CharacterView::Typed)
            .chain(self.characters.iter().map(CharacterView::Pending))
    }

    /// The word's source text.
    pub fn source(&self) -> String {
        self.typed_characters
            .iter()
            .filter(|c| !c.is_extra)
            .map(|c| c.value.as_str())
            .chain(self.characters.iter().map(|c| c.value.as_str()))
            .collect()
    }

    /// `true` if `characters + non-extra typed == character_count`.
    pub fn is_consistent(&self) -> bool {
        let typed = self.typed_characters.iter().filter(|c| !c.is_extra).count();
        self.characters.len() + typed == self.character_count
    }

    /// `true` if every typed character so far matches its source character.
    pub fn is_correct_so_far(&self) -> bool {
        self.typed_characters.iter().all(TypedCharacter::is_correct)
    }

    /// Type `key` onto the word: consume the next source character or append an extra.
    pub(crate) fn push_key(&mut self, key: &str) -> &TypedCharacter {
        let typed = match self.characters.pop_front() {
            Some(character) => TypedCharacter::typed(character, key),
            None => {
                let idx = self
                    .typed_characters
                    .last()
                    .map(|c| c.idx.shifted(1))
                    .unwrap_or_default();
                TypedCharacter::extra(idx, key)
            }
        };
        self.typed_characters.push(typed);
        &self.typed_characters[self.typed_characters.len() - 1]
    }

    /// Force-commit every remaining source character as skipped. Returns how many were skipped.
    pub(crate) fn skip_remaining(&mut self) -> usize {
        let skipped = self.characters.len();
        self.typed_characters
            .extend(self.characters.drain(..).map(TypedCharacter::skipped));
        skipped
    }

    /// Remove the last typed character, returning a non-extra one to the front of the queue.
    pub(crate) fn pop_typed(&mut self) -> Option<TypedCharacter> {
        let typed = self.typed_characters.pop()?;
        if !typed.is_extra {
            self.characters.push_front(Character::from(typed.clone()));
        }
        Some(typed)
    }

    pub(crate) fn set_relative(&mut self, relative: isize) {
        self.idx = self.idx.with_relative(relative);
    }

    pub(crate) fn renumber_original(&mut self, cursor: &mut isize) {
        renumber_original(
            self.typed_characters.iter_mut(),
            self.characters.iter_mut(),
            cursor,
        );
    }
}

/// A committed word. Its pending queue is empty by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedWord {
    character_count: usize,
    idx: Position,
    typed_characters: Vec<TypedCharacter>,
    is_correct: bool,
}

impl TryFrom<Word> for TypedWord {
    type Error = TypingError;

    /// Commit a word. Fails with [`TypingError::IncompleteWord`] if it still has characters to
    /// be typed.
    fn try_from(word: Word) -> Result<Self, Self::Error> {
        if !word.characters.is_empty() {
            return Err(TypingError::IncompleteWord {
                remaining: word.characters.len(),
            });
        }

        let is_correct = word.typed_characters.iter().all(TypedCharacter::is_correct);
        Ok(Self {
            character_count: word.character_count,
            idx: word.idx,
            typed_characters: word.typed_characters,
            is_correct,
        })
    }
}

impl TypedWord {
    /// Original length of the word (extras excluded).
    pub fn character_count(&self) -> usize {
        self.character_count
    }

    /// Position of the word.
    pub fn idx(&self) -> Position {
        self.idx
    }

    /// Everything typed for this word.
    pub fn typed_characters(&self) -> &[TypedCharacter] {
        &self.typed_characters
    }

    /// `true` if every character was typed correctly and no extras were typed.
    pub fn is_correct(&self) -> bool {
        self.is_correct
    }

    /// `true` if any source character was skipped with space.
    pub fn has_skipped(&self) -> bool {
        self.typed_characters.iter().any(TypedCharacter::is_skipped)
    }

    /// Letters in render order.
    pub fn letters(&self) -> impl Iterator<Item = CharacterView<'_>> {
        self.typed_characters.iter().map(CharacterView::Typed)
    }

    /// The word's source text.
    pub fn source(&self) -> String {
        self.typed_characters
            .iter()
            .filter(|c| !c.is_extra)
            .map(|c| c.value.as_str())
            .collect()
    }

    /// What the user typed for this word (skipped characters excluded).
    pub fn typed_text(&self) -> String {
        self.typed_characters
            .iter()
            .filter(|c| !c.is_skipped())
            .map(|c| c.typed_value.as_str())
            .collect()
    }

    /// `true` if `non-extra typed == character_count`.
    pub fn is_consistent(&self) -> bool {
        self.typed_characters.iter().filter(|c| !c.is_extra).count() == self.character_count
    }

    /// Turn the committed word back into a mutable [`Word`] for re-typing.
    ///
    /// With [`RevertMode::RestoreSkipped`], the trailing run of skipped characters is stripped
    /// of its typed metadata and returned to the pending queue; everything before it stays
    /// typed. A literal space typed mid-word is not part of that run.
    pub fn revert(self, mode: RevertMode) -> Word {
        let (characters, typed_characters) = match mode {
            RevertMode::Verbatim => (VecDeque::new(), self.typed_characters),
            RevertMode::RestoreSkipped => {
                let mut kept = self.typed_characters;
                let keep = kept
                    .iter()
                    .rposition(|c| !c.is_skipped())
                    .map_or(0, |i| i + 1);
                let skipped = kept.split_off(keep);
                (skipped.into_iter().map(Character::from).collect(), kept)
            }
        };

        Word {
            character_count: self.character_count,
            idx: self.idx,
            characters,
            typed_characters,
        }
    }

    pub(crate) fn set_relative(&mut self, relative: isize) {
        self.idx = self.idx.with_relative(relative);
    }

    pub(crate) fn renumber_original(&mut self, cursor: &mut isize) {
        renumber_original(self.typed_characters.iter_mut(), std::iter::empty(), cursor);
    }
}
