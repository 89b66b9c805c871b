//! Session owner: start/stop gate, key dispatch, and pruning after committed words.

use std::cell::RefCell;
use std::rc::Rc;

use crate::geometry::RowGeometryProvider;
use crate::observer::{Observer, Subscription};
use crate::pruner::{LineWindowPruner, PruneReport};
use crate::state::{EventKind, KeyOutcome, TypingEvent, TypingState};
use crate::{BehaviorPolicy, TypingError};

/// A key press as seen by the session, independent of the input backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// A printable character (space included).
    Char(char),
    /// Backspace.
    Backspace,
    /// Enter.
    Enter,
    /// Tab.
    Tab,
    /// Escape.
    Escape,
    /// Any arrow key.
    Arrow,
    /// A bare modifier (Shift, Control, Alt, Meta).
    Modifier,
}

/// What the frontend should do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResponse {
    /// Not ours; let the default action happen.
    Ignored,
    /// No state change; suppress the default action.
    Suppressed,
    /// State changed. Carries a prune report if committed rows were archived.
    Handled {
        /// Words archived by the pruner after this key, if any.
        pruned: Option<PruneReport>,
    },
    /// The text is complete; the session has ended.
    Finished,
    /// The policy's quick-restart key; the frontend decides what to restart.
    RestartRequested,
}

/// Owns a [`TypingState`], a [`LineWindowPruner`] and a row geometry provider.
///
/// By default the session ends once every word has been committed. A streaming session treats
/// running out of words as a pause instead: input is suppressed until [`TypingSession::extend`]
/// appends more text.
pub struct TypingSession<G> {
    state: TypingState,
    pruner: LineWindowPruner,
    geometry: G,
    committed: Rc<RefCell<Vec<TypingEvent>>>,
    inbox: Option<Subscription<TypingEvent>>,
    has_started: bool,
    is_finished: bool,
    streaming: bool,
}

impl<G: RowGeometryProvider> TypingSession<G> {
    /// Create a session for `text`.
    pub fn new(text: &str, policy: BehaviorPolicy, geometry: G) -> Result<Self, TypingError> {
        let mut geometry = geometry;
        let state = TypingState::new(text, policy)?;
        geometry.sync(state.window());

        Ok(Self {
            state,
            pruner: LineWindowPruner::new(),
            geometry,
            committed: Rc::new(RefCell::new(Vec::new())),
            inbox: None,
            has_started: false,
            is_finished: false,
            streaming: false,
        })
    }

    /// Replace the pruner.
    pub fn with_pruner(mut self, pruner: LineWindowPruner) -> Self {
        self.pruner = pruner;
        self
    }

    /// Keep the session open when the pending words run out.
    pub fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    /// Whether running out of words pauses rather than ends the session.
    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    /// Begin accepting input. No-op if already started or finished.
    pub fn start(&mut self) {
        if self.has_started || self.is_finished {
            return;
        }

        let committed = self.committed.clone();
        self.inbox = Some(self.state.subscribe(move |event| {
            if event.kind() == EventKind::Next {
                committed.borrow_mut().push(event.clone());
            }
        }));
        self.state.start();
        self.has_started = true;
        tracing::debug!("typing session started");
    }

    /// Stop accepting input. A finished session cannot be restarted.
    pub fn end(&mut self) {
        if !self.has_started {
            return;
        }

        if let Some(inbox) = self.inbox.take() {
            inbox.unsubscribe();
        }
        self.committed.borrow_mut().clear();
        self.state.stop();
        self.has_started = false;
        self.is_finished = true;
        tracing::debug!(
            committed = self.state.typed_words().len() + self.state.archived_count(),
            "typing session ended"
        );
    }

    /// Whether the session is accepting input.
    pub fn has_started(&self) -> bool {
        self.has_started
    }

    /// Whether the session has ended.
    pub fn is_finished(&self) -> bool {
        self.is_finished
    }

    /// The typing state (read-only).
    pub fn state(&self) -> &TypingState {
        &self.state
    }

    /// The notification bus of the underlying state.
    pub fn events(&self) -> &Observer<TypingEvent> {
        self.state.events()
    }

    /// The geometry provider.
    pub fn geometry(&self) -> &G {
        &self.geometry
    }

    /// The geometry provider, mutably (e.g. to change the container width).
    ///
    /// Call [`TypingSession::relayout`] afterwards.
    pub fn geometry_mut(&mut self) -> &mut G {
        &mut self.geometry
    }

    /// Re-sync the geometry with the current window.
    pub fn relayout(&mut self) {
        self.geometry.sync(self.state.window());
    }

    /// Append text to type.
    pub fn extend(&mut self, text: &str) -> Result<(), TypingError> {
        self.state.add_to_string(text)?;
        self.relayout();
        Ok(())
    }

    /// Dispatch one key press.
    pub fn handle_key(&mut self, key: KeyInput) -> Result<KeyResponse, TypingError> {
        if self.is_finished {
            return Ok(KeyResponse::Suppressed);
        }

        let outcome = match key {
            KeyInput::Modifier => return Ok(KeyResponse::Ignored),
            KeyInput::Arrow => return Ok(KeyResponse::Suppressed),
            KeyInput::Enter | KeyInput::Tab | KeyInput::Escape => {
                if self.state.policy().quick_restart.accepts(key) {
                    return Ok(KeyResponse::RestartRequested);
                }
                return Ok(KeyResponse::Suppressed);
            }
            KeyInput::Backspace => self.state.backspace()?,
            KeyInput::Char(c) => {
                let mut buf = [0u8; 4];
                self.state.add_character(c.encode_utf8(&mut buf))?
            }
        };

        let pruned = self.drain_committed()?;
        self.relayout();

        match outcome {
            KeyOutcome::Suppressed => Ok(KeyResponse::Suppressed),
            KeyOutcome::Finished | KeyOutcome::Handled if self.streaming => {
                if self.state.is_exhausted() {
                    tracing::debug!("waiting for more text");
                }
                Ok(KeyResponse::Handled { pruned })
            }
            KeyOutcome::Finished => {
                self.end();
                Ok(KeyResponse::Finished)
            }
            KeyOutcome::Handled if self.state.is_exhausted() => {
                self.end();
                Ok(KeyResponse::Finished)
            }
            KeyOutcome::Handled => Ok(KeyResponse::Handled { pruned }),
        }
    }

    fn drain_committed(&mut self) -> Result<Option<PruneReport>, TypingError> {
        let events: Vec<TypingEvent> = self.committed.borrow_mut().drain(..).collect();

        let mut report: Option<PruneReport> = None;
        for event in events {
            if let Some(mut pruned) =
                self.pruner
                    .on_event(&event, &mut self.state, &mut self.geometry)?
            {
                match report.as_mut() {
                    Some(earlier) => {
                        earlier.archived.append(&mut pruned.archived);
                        earlier.first_absolute = pruned.first_absolute;
                    }
                    None => report = Some(pruned),
                }
            }
        }
        Ok(report)
    }
}
