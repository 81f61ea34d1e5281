//! The boundary between the engine and a host record.

use crate::runtime::state_runtime::StateRuntime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error code reported on the event-request key when a requested event
/// cannot fire from the record's source state.
pub const INVALID_TRANSITION: &str = "invalid_transition";

/// A record whose attributes are driven by state machines.
///
/// The host owns attribute storage and dirty tracking; the engine only
/// reads and writes state attributes by name, asks for the last persisted
/// value, and populates the validation-error channel.
pub trait StatefulRecord: Sized {
    /// Per-instance engine state. Must be created fresh for every instance,
    /// including duplicates (see [`StateRuntime`]'s `Clone`).
    fn state_runtime(&self) -> &StateRuntime<Self>;

    fn state_runtime_mut(&mut self) -> &mut StateRuntime<Self>;

    /// Current, possibly unsaved, value of a state attribute.
    fn read_state(&self, attribute: &str) -> Option<String>;

    fn write_state(&mut self, attribute: &str, value: Option<String>);

    /// Value of a state attribute as of the last successful write.
    fn persisted_state(&self, attribute: &str) -> Option<String>;

    /// Whether the record has never been written.
    fn is_new_record(&self) -> bool;

    fn errors(&self) -> &ValidationErrors;

    fn errors_mut(&mut self) -> &mut ValidationErrors;
}

/// A single validation failure: the attribute (or other key) and a code.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct ValidationError {
    pub key: String,
    pub code: String,
}

impl ValidationError {
    pub fn new(key: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            code: code.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.key, self.code)
    }
}

/// Validation errors of one record, in the order they were added.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct ValidationErrors {
    entries: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: impl Into<String>, code: impl Into<String>) {
        self.entries.push(ValidationError::new(key, code));
    }

    pub fn push(&mut self, error: ValidationError) {
        self.entries.push(error);
    }

    /// Codes reported for `key`.
    pub fn on(&self, key: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.key == key)
            .map(|e| e.code.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries: Vec<String> = self.entries.iter().map(ToString::to_string).collect();
        f.write_str(&entries.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_are_grouped_by_key() {
        let mut errors = ValidationErrors::new();
        errors.add("weight", "blank");
        errors.add("state_event", INVALID_TRANSITION);
        errors.add("weight", "too_light");

        assert_eq!(errors.on("weight"), vec!["blank", "too_light"]);
        assert_eq!(errors.on("state_event"), vec!["invalid_transition"]);
        assert!(errors.on("state").is_empty());
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn display_joins_entries() {
        let mut errors = ValidationErrors::new();
        errors.add("weight", "blank");
        errors.add("state_event", INVALID_TRANSITION);
        assert_eq!(errors.to_string(), "weight blank, state_event invalid_transition");

        errors.clear();
        assert!(errors.is_empty());
    }
}
