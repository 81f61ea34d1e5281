//! Machine definitions: the states and events bound to one record attribute.

use crate::core::event::Event;
use crate::core::state::State;
use crate::runtime::Error;
use std::fmt;
use std::sync::Arc;

/// Suffix of the raw event-request pseudo-attribute (`state` -> `state_event`).
pub const EVENT_ATTRIBUTE_SUFFIX: &str = "_event";

/// One state machine, keyed by the attribute it drives.
///
/// Built through [`MachineBuilder`](crate::builder::MachineBuilder), which
/// guarantees that every transition references declared states, that no
/// event declares two transitions from the same state and that at most one
/// state is initial. Immutable afterwards.
pub struct MachineDefinition<R> {
    attribute: String,
    prefix: String,
    states: Vec<State>,
    events: Vec<Arc<Event<R>>>,
}

impl<R> MachineDefinition<R> {
    pub(crate) fn from_parts(
        attribute: String,
        prefix: String,
        states: Vec<State>,
        events: Vec<Arc<Event<R>>>,
    ) -> Self {
        Self {
            attribute,
            prefix,
            states,
            events,
        }
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Name of the raw event-request pseudo-attribute, e.g. `state_event`.
    pub fn event_attribute(&self) -> String {
        format!("{}{}", self.attribute, EVENT_ATTRIBUTE_SUFFIX)
    }

    /// `"<prefix>_"`, or empty without a prefix.
    pub fn method_prefix(&self) -> String {
        if self.prefix.is_empty() {
            String::new()
        } else {
            format!("{}_", self.prefix.to_lowercase())
        }
    }

    /// `"<PREFIX>_"`, or empty without a prefix.
    pub fn constant_prefix(&self) -> String {
        if self.prefix.is_empty() {
            String::new()
        } else {
            format!("{}_", self.prefix.to_uppercase())
        }
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn events(&self) -> &[Arc<Event<R>>] {
        &self.events
    }

    /// State names in declaration order.
    pub fn state_names(&self) -> Vec<&str> {
        self.states.iter().map(State::name).collect()
    }

    /// Event names in declaration order.
    pub fn event_names(&self) -> Vec<&str> {
        self.events.iter().map(|e| e.name()).collect()
    }

    pub fn is_valid_state(&self, name: &str) -> bool {
        self.states.iter().any(|s| s.name() == name)
    }

    pub fn find_event(&self, name: &str) -> Result<&Arc<Event<R>>, Error> {
        self.events
            .iter()
            .find(|e| e.name() == name)
            .ok_or_else(|| Error::UndefinedEvent {
                attribute: self.attribute.clone(),
                event: name.to_string(),
            })
    }

    /// The state new records start in, if one was declared initial.
    pub fn initial_state(&self) -> Option<&State> {
        self.states.iter().find(|s| s.is_initial())
    }
}

impl<R> fmt::Debug for MachineDefinition<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MachineDefinition")
            .field("attribute", &self.attribute)
            .field("prefix", &self.prefix)
            .field("states", &self.states)
            .field("events", &self.events)
            .finish()
    }
}
