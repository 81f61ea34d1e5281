//! Persisted transition history of one record.
//!
//! Every event that reaches the post-persist flush is recorded here, across
//! all machines of the record. Histories are values: `record` returns a new
//! history and leaves the original untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single persisted transition.
///
/// # Example
///
/// ```rust
/// use recordfsm::core::{StateHistory, StateTransition};
/// use chrono::Utc;
///
/// let history = StateHistory::new().record(StateTransition {
///     attribute: "state".to_string(),
///     event: "pack".to_string(),
///     from: Some("empty".to_string()),
///     to: "filled".to_string(),
///     timestamp: Utc::now(),
/// });
///
/// assert_eq!(history.get_path("state"), vec!["empty", "filled"]);
/// ```
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct StateTransition {
    /// Attribute of the machine that transitioned
    pub attribute: String,
    /// Event that caused the transition
    pub event: String,
    /// Source state (unset for records that never had a state)
    pub from: Option<String>,
    /// Target state
    pub to: String,
    /// When the transition was persisted
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of persisted transitions.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StateHistory {
    transitions: Vec<StateTransition>,
}

impl StateHistory {
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Record a transition, returning a new history.
    pub fn record(&self, transition: StateTransition) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        Self { transitions }
    }

    /// States traversed by the machine on `attribute`: the first source
    /// state (if set), then each target.
    pub fn get_path(&self, attribute: &str) -> Vec<&str> {
        let mut matching = self
            .transitions
            .iter()
            .filter(|t| t.attribute == attribute)
            .peekable();

        let mut path = Vec::new();
        if let Some(from) = matching.peek().and_then(|t| t.from.as_deref()) {
            path.push(from);
        }
        for transition in matching {
            path.push(transition.to.as_str());
        }
        path
    }

    /// Events in the order they were persisted, across all machines.
    pub fn events(&self) -> Vec<&str> {
        self.transitions.iter().map(|t| t.event.as_str()).collect()
    }

    /// Time between the first and last recorded transition.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    pub fn transitions(&self) -> &[StateTransition] {
        &self.transitions
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
