//! Declared states of a machine.
//!
//! A state is only a name plus an "initial" flag. State values stored on a
//! record are plain strings (`Option<String>` when the attribute may be unset),
//! so states declared here are looked up by name.

use serde::{Deserialize, Serialize};

/// A named state declared on a machine.
///
/// # Example
///
/// ```rust
/// use recordfsm::core::State;
///
/// let empty = State::initial("empty");
/// let filled = State::new("filled");
///
/// assert!(empty.is_initial());
/// assert!(!filled.is_initial());
/// assert_eq!(filled.name(), "filled");
/// ```
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct State {
    name: String,
    initial: bool,
}

impl State {
    /// Create a non-initial state.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            initial: false,
        }
    }

    /// Create the initial state of a machine.
    pub fn initial(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            initial: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// New records with an unset attribute start in this state.
    pub fn is_initial(&self) -> bool {
        self.initial
    }
}
