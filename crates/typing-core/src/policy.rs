//! Behavior policy.
//!
//! A [`BehaviorPolicy`] is passed explicitly to [`TypingState::new`](crate::TypingState::new)
//! and consulted on every operation. It deserializes from the same camelCase JSON shape the
//! settings store persists, with every field optional:
//!
//! ```rust
//! use typing_core::{BehaviorPolicy, ConfidenceMode};
//!
//! let policy = BehaviorPolicy::from_json(r#"{ "confidenceMode": "max" }"#).unwrap();
//! assert_eq!(policy.confidence_mode, ConfidenceMode::Max);
//! assert!(policy.strict_space);
//! ```

use serde::{Deserialize, Serialize};

use crate::TypingError;
use crate::session::KeyInput;

/// How much backward navigation is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceMode {
    /// Backspace works everywhere, including into correctly typed words.
    Off,
    /// Backspace cannot revert a word that was committed correctly.
    #[default]
    On,
    /// Backspace is disabled entirely.
    Max,
}

/// Which key requests a quick restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuickRestart {
    /// No quick restart.
    Off,
    /// Escape.
    #[default]
    Esc,
    /// Tab.
    Tab,
    /// Enter.
    Enter,
}

impl QuickRestart {
    /// `true` if `key` is the configured restart key.
    pub fn accepts(self, key: KeyInput) -> bool {
        matches!(
            (self, key),
            (QuickRestart::Esc, KeyInput::Escape)
                | (QuickRestart::Tab, KeyInput::Tab)
                | (QuickRestart::Enter, KeyInput::Enter)
        )
    }
}

/// Per-session typing rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BehaviorPolicy {
    /// Backspace restrictions.
    pub confidence_mode: ConfidenceMode,
    /// When `true`, space is a literal character and only advances at the end of a word.
    pub strict_space: bool,
    /// When `true`, the session finishes as soon as the last word is typed correctly.
    pub eager_finish: bool,
    /// Key that asks the frontend to restart.
    pub quick_restart: QuickRestart,
}

impl Default for BehaviorPolicy {
    fn default() -> Self {
        Self {
            confidence_mode: ConfidenceMode::On,
            strict_space: true,
            eager_finish: false,
            quick_restart: QuickRestart::Esc,
        }
    }
}

impl BehaviorPolicy {
    /// Parse a policy from JSON. Missing fields take their default.
    pub fn from_json(json: &str) -> Result<Self, TypingError> {
        serde_json::from_str(json).map_err(|e| TypingError::Config(e.to_string()))
    }

    /// Parse a policy from JSON, falling back to [`BehaviorPolicy::default`] on malformed input.
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(policy) => policy,
            Err(err) => {
                tracing::warn!(%err, "invalid behavior policy, using defaults");
                Self::default()
            }
        }
    }

    /// Serialize the policy to JSON.
    pub fn to_json(&self) -> Result<String, TypingError> {
        serde_json::to_string(self).map_err(|e| TypingError::Config(e.to_string()))
    }

    /// Builder-style setter for [`BehaviorPolicy::confidence_mode`].
    pub fn with_confidence_mode(mut self, confidence_mode: ConfidenceMode) -> Self {
        self.confidence_mode = confidence_mode;
        self
    }

    /// Builder-style setter for [`BehaviorPolicy::strict_space`].
    pub fn with_strict_space(mut self, strict_space: bool) -> Self {
        self.strict_space = strict_space;
        self
    }

    /// Builder-style setter for [`BehaviorPolicy::eager_finish`].
    pub fn with_eager_finish(mut self, eager_finish: bool) -> Self {
        self.eager_finish = eager_finish;
        self
    }

    /// Builder-style setter for [`BehaviorPolicy::quick_restart`].
    pub fn with_quick_restart(mut self, quick_restart: QuickRestart) -> Self {
        self.quick_restart = quick_restart;
        self
    }
}
