use std::collections::BTreeMap;

use pretty_assertions::assert_eq;
use typing_core::{
    BehaviorPolicy, KeyInput, KeyResponse, LineWindowPruner, MeasuredRows, Position,
    RowGeometryProvider, TypingSession, WindowWord, WrappedRowGeometry,
};

const TEXT: &str = "abc def ghi jkl mno pqr stu vwx yza bcd efg hij klm nop qrs";

// Five three-letter words fit in 20 cells (5 * 3 + 4 gaps = 19).
const WIDTH: usize = 20;

fn session() -> TypingSession<WrappedRowGeometry> {
    let mut session =
        TypingSession::new(TEXT, BehaviorPolicy::default(), WrappedRowGeometry::new(WIDTH))
            .unwrap();
    session.start();
    session
}

fn commit_word<G: RowGeometryProvider>(session: &mut TypingSession<G>, word: &str) -> KeyResponse {
    let mut last = KeyResponse::Ignored;
    for c in word.chars().chain(std::iter::once(' ')) {
        last = session.handle_key(KeyInput::Char(c)).unwrap();
    }
    last
}

/// Absolute word index -> absolute original-string indices of its characters.
fn absolute_snapshot(
    session: &TypingSession<WrappedRowGeometry>,
) -> BTreeMap<isize, Vec<isize>> {
    session
        .state()
        .window()
        .iter()
        .map(|word: WindowWord<'_>| {
            let chars = word.letters().map(|l| l.original_idx().absolute).collect();
            (word.idx().absolute, chars)
        })
        .collect()
}

#[test]
fn test_tenth_commit_archives_first_row() {
    let mut session = session();
    let words: Vec<&str> = TEXT.split(' ').collect();

    for word in &words[..9] {
        let response = commit_word(&mut session, word);
        assert_eq!(response, KeyResponse::Handled { pruned: None });
    }
    assert_eq!(session.geometry().row_index(9), Some(1));
    let before = absolute_snapshot(&session);

    let response = commit_word(&mut session, words[9]);
    let KeyResponse::Handled {
        pruned: Some(report),
    } = response
    else {
        panic!("expected a prune on the tenth commit, got {response:?}");
    };

    let archived: Vec<String> = report.archived.iter().map(|w| w.source()).collect();
    assert_eq!(archived, vec!["abc", "def", "ghi", "jkl", "mno"]);
    assert_eq!(report.first_absolute, 5);

    let state = session.state();
    assert_eq!(state.archived_count(), 5);
    assert_eq!(state.typed_words().len(), 5);

    let first = &state.typed_words()[0];
    assert_eq!(first.idx(), Position::new(5, 0));
    assert_eq!(
        first.typed_characters()[0].original_idx,
        Position::new(20, 0)
    );
    assert_eq!(state.active_word().unwrap().idx(), Position::new(10, 5));

    // Surviving entities keep their absolute coordinates.
    let after = absolute_snapshot(&session);
    for (word, chars) in &after {
        assert_eq!(before.get(word), Some(chars));
    }
    assert_eq!(after.keys().next(), Some(&5));

    // The window is now two rows deep again.
    assert_eq!(session.geometry().row_index(0), Some(0));
    assert_eq!(session.geometry().row_index(5), Some(1));
}

#[test]
fn test_relative_indices_are_contiguous_after_prune() {
    let mut session = session();
    for word in TEXT.split(' ').take(10) {
        commit_word(&mut session, word);
    }

    let window = session.state().window();
    let relatives: Vec<isize> = window.iter().map(|w| w.idx().relative).collect();
    let expected: Vec<isize> = (0..window.len() as isize).collect();
    assert_eq!(relatives, expected);

    let char_relatives: Vec<isize> = window
        .iter()
        .flat_map(|w| w.letters().map(|l| l.original_idx().relative).collect::<Vec<_>>())
        .collect();
    let expected: Vec<isize> = (0..window.len() as isize)
        .flat_map(|w| (0..3).map(move |c| w * 4 + c))
        .collect();
    assert_eq!(char_relatives, expected);
}

#[test]
fn test_backspace_after_prune_reaches_renumbered_word() {
    let mut session = TypingSession::new(
        TEXT,
        BehaviorPolicy::default().with_confidence_mode(typing_core::ConfidenceMode::Off),
        WrappedRowGeometry::new(WIDTH),
    )
    .unwrap();
    session.start();
    for word in TEXT.split(' ').take(10) {
        commit_word(&mut session, word);
    }

    let response = session.handle_key(KeyInput::Backspace).unwrap();
    assert_eq!(response, KeyResponse::Handled { pruned: None });
    let active = session.state().active_word().unwrap();
    assert_eq!(active.idx(), Position::new(9, 4));
    assert_eq!(active.source(), "bcd");
}

#[test]
fn test_measured_rows_drive_the_pruner() {
    let mut session = TypingSession::new(
        "aa bb cc dd ee",
        BehaviorPolicy::default(),
        MeasuredRows::new(vec![0, 0, 1, 1, 2]),
    )
    .unwrap()
    .with_pruner(LineWindowPruner::new());
    session.start();

    for c in "aa bb cc ".chars() {
        assert_eq!(
            session.handle_key(KeyInput::Char(c)).unwrap(),
            KeyResponse::Handled { pruned: None }
        );
    }

    // The frontend re-measures before the fourth word is committed.
    session.geometry_mut().set_rows(vec![0, 0, 1, 1, 2]);
    let mut responses = Vec::new();
    for c in "dd ".chars() {
        responses.push(session.handle_key(KeyInput::Char(c)).unwrap());
    }
    let Some(KeyResponse::Handled {
        pruned: Some(report),
    }) = responses.last()
    else {
        panic!("expected a prune, got {responses:?}");
    };
    assert_eq!(report.archived.len(), 2);
    assert_eq!(session.state().typed_words()[0].idx(), Position::new(2, 0));
}

#[test]
fn test_measured_rows_prune_twice() {
    // Twenty three-letter words, five per row: the boundary sits after word 4, then word 9.
    let words: Vec<String> = (0..20).map(|i| format!("w{i:02}")).collect();
    let rows: Vec<usize> = (0..20).map(|i| i / 5).collect();
    let mut session = TypingSession::new(
        &words.join(" "),
        BehaviorPolicy::default(),
        MeasuredRows::new(rows),
    )
    .unwrap();
    session.start();

    for word in &words[..9] {
        assert_eq!(
            commit_word(&mut session, word),
            KeyResponse::Handled { pruned: None }
        );
    }

    // The tenth commit moves the active word onto row 2.
    let KeyResponse::Handled {
        pruned: Some(first),
    } = commit_word(&mut session, &words[9])
    else {
        panic!("expected the first prune on the tenth commit");
    };
    assert_eq!(first.archived.len(), 5);
    assert_eq!(first.first_absolute, 5);
    assert_eq!(session.state().archived_count(), 5);
    assert_eq!(session.geometry().row_index(0), Some(0));
    assert_eq!(session.geometry().row_index(5), Some(1));
    assert_eq!(session.geometry().row_index(10), Some(2));

    for word in &words[10..14] {
        assert_eq!(
            commit_word(&mut session, word),
            KeyResponse::Handled { pruned: None }
        );
    }

    let KeyResponse::Handled {
        pruned: Some(second),
    } = commit_word(&mut session, &words[14])
    else {
        panic!("expected the second prune on the fifteenth commit");
    };
    let archived: Vec<String> = second.archived.iter().map(|w| w.source()).collect();
    assert_eq!(archived, vec!["w05", "w06", "w07", "w08", "w09"]);
    assert_eq!(second.first_absolute, 10);

    let state = session.state();
    assert_eq!(state.archived_count(), 10);
    assert_eq!(state.typed_words().len(), 5);
    assert_eq!(state.typed_words()[0].idx(), Position::new(10, 0));
    assert_eq!(state.active_word().unwrap().idx(), Position::new(15, 5));

    let first_char = &state.typed_words()[0].typed_characters()[0];
    assert_eq!(first_char.original_idx, Position::new(40, 0));
    let char_relatives: Vec<isize> = state
        .window()
        .iter()
        .flat_map(|w| w.letters().map(|l| l.original_idx().relative).collect::<Vec<_>>())
        .collect();
    let expected: Vec<isize> = (0..10)
        .flat_map(|w| (0..3).map(move |c| w * 4 + c))
        .collect();
    assert_eq!(char_relatives, expected);
}
