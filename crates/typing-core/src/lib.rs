#![warn(missing_docs)]
//! Typing Core - Headless Typing-Exercise Engine
//!
//! # Overview
//!
//! `typing-core` tracks the state of a typing exercise one keystroke at a time. It does not
//! render anything; it assumes the upper layer provides a view that lays out words in rows and
//! reacts to change events.
//!
//! # Core Features
//!
//! - **Keystroke State Machine**: character and word correctness, extra characters, space
//!   skipping, backspace into the previous word
//! - **Change Notifications**: every mutation fires exactly one event after it is applied
//! - **Absolute / Relative Indices**: lifetime positions plus render-window positions
//! - **Line Window Pruning**: rows that scrolled out are archived and the window renumbered, so
//!   unbounded texts keep a bounded live window
//! - **Unicode Aware**: keystrokes match grapheme clusters; layout uses UAX #11 cell widths
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Session (start/stop, key dispatch)         │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Line Window Pruner + Row Geometry          │  ← Window Management
//! ├─────────────────────────────────────────────┤
//! │  Typing State Machine                       │  ← Keystroke Semantics
//! ├─────────────────────────────────────────────┤
//! │  Notification Bus                           │  ← Change Events
//! ├─────────────────────────────────────────────┤
//! │  Entity & Position Model                    │  ← Data
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use typing_core::{BehaviorPolicy, KeyInput, TypingSession, WrappedRowGeometry};
//!
//! let mut session = TypingSession::new(
//!     "the quick brown fox",
//!     BehaviorPolicy::default(),
//!     WrappedRowGeometry::new(40),
//! )
//! .unwrap();
//!
//! let _subscription = session.events().subscribe(|event| {
//!     println!("{:?}", event.kind());
//! });
//!
//! session.start();
//! for c in "the ".chars() {
//!     session.handle_key(KeyInput::Char(c)).unwrap();
//! }
//!
//! let state = session.state();
//! assert_eq!(state.typed_words().len(), 1);
//! assert!(state.typed_words()[0].is_correct());
//! assert_eq!(state.active_word().unwrap().source(), "quick");
//! ```
//!
//! # Module Description
//!
//! - [`position`] - `{absolute, relative}` index pairs
//! - [`word`] - characters and words, pending and typed
//! - [`observer`] - synchronous publish/subscribe
//! - [`state`] - the typing state machine
//! - [`pruner`] - line window pruning and renumbering
//! - [`geometry`] - row geometry providers
//! - [`caret`] - logical caret placement
//! - [`policy`] - behavior policy and its JSON form
//! - [`session`] - session owner and key dispatch

pub mod caret;
mod error;
pub mod geometry;
pub mod observer;
pub mod policy;
pub mod position;
pub mod pruner;
pub mod session;
pub mod state;
pub mod text;
pub mod word;

pub use caret::{CaretSlot, caret_slot};
pub use error::TypingError;
pub use geometry::{MeasuredRows, RowGeometryProvider, WrappedRowGeometry};
pub use observer::{Observer, Subscription, SubscriptionId};
pub use policy::{BehaviorPolicy, ConfidenceMode, QuickRestart};
pub use position::Position;
pub use pruner::{LineWindowPruner, PruneReport};
pub use session::{KeyInput, KeyResponse, TypingSession};
pub use state::{EventKind, KeyOutcome, TypingEvent, TypingState, WindowWord, WordWindow};
pub use word::{Character, CharacterView, RevertMode, TypedCharacter, TypedWord, Word};
