//! Builder for constructing machine definitions.

use crate::builder::error::DefinitionError;
use crate::builder::event::EventBuilder;
use crate::core::{Event, MachineDefinition, State, Transition, DEFAULT_STATE_ATTRIBUTE};
use std::sync::Arc;

/// Builder for one machine with a fluent API.
///
/// States must be declared before the events that reference them.
pub struct MachineBuilder<R> {
    attribute: String,
    prefix: String,
    states: Vec<State>,
    events: Vec<Arc<Event<R>>>,
}

impl<R> MachineBuilder<R> {
    /// Create a builder for the machine driving `attribute`.
    pub fn new(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            prefix: String::new(),
            states: Vec::new(),
            events: Vec::new(),
        }
    }

    pub(crate) fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Prefix generated state predicates and constants with `prefix`.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Declare a state.
    pub fn state(self, name: &str) -> Result<Self, DefinitionError> {
        self.add_state(State::new(name))
    }

    /// Declare the state new records start in.
    pub fn initial_state(self, name: &str) -> Result<Self, DefinitionError> {
        if let Some(first) = self.states.iter().find(|s| s.is_initial()) {
            return Err(DefinitionError::MultipleInitialStates {
                attribute: self.attribute.clone(),
                first: first.name().to_string(),
                second: name.to_string(),
            });
        }
        self.add_state(State::initial(name))
    }

    fn add_state(mut self, state: State) -> Result<Self, DefinitionError> {
        if self.has_state(state.name()) {
            return Err(DefinitionError::DuplicateState {
                attribute: self.attribute.clone(),
                state: state.name().to_string(),
            });
        }
        self.states.push(state);
        Ok(self)
    }

    fn has_state(&self, name: &str) -> bool {
        self.states.iter().any(|s| s.name() == name)
    }

    /// Declare an event. Its transitions are validated against the states
    /// declared so far and the event is frozen.
    pub fn event(mut self, builder: EventBuilder<R>) -> Result<Self, DefinitionError> {
        let EventBuilder {
            name,
            transitions: declared,
            callbacks,
        } = builder;

        if self.events.iter().any(|e| e.name() == name) {
            return Err(DefinitionError::DuplicateEvent {
                attribute: self.attribute.clone(),
                event: name,
            });
        }

        let mut transitions: Vec<Transition> = Vec::new();
        for (froms, to) in declared {
            if froms.is_empty() {
                return Err(DefinitionError::EmptyTransition { event: name, to });
            }
            self.ensure_state(&name, &to)?;
            for from in froms {
                self.ensure_state(&name, &from)?;
                if let Some(existing) = transitions.iter().find(|t| t.from == from) {
                    return Err(DefinitionError::ExistingTransition {
                        event: name,
                        from,
                        to: existing.to.clone(),
                    });
                }
                transitions.push(Transition::new(from, to.clone()));
            }
        }

        self.events
            .push(Arc::new(Event::from_parts(name, transitions, callbacks)));
        Ok(self)
    }

    fn ensure_state(&self, event: &str, state: &str) -> Result<(), DefinitionError> {
        if self.has_state(state) {
            Ok(())
        } else {
            Err(DefinitionError::UndefinedState {
                attribute: self.attribute.clone(),
                event: event.to_string(),
                state: state.to_string(),
            })
        }
    }

    /// Freeze the machine.
    pub fn build(self) -> MachineDefinition<R> {
        MachineDefinition::from_parts(self.attribute, self.prefix, self.states, self.events)
    }
}

impl<R> Default for MachineBuilder<R> {
    fn default() -> Self {
        Self::new(DEFAULT_STATE_ATTRIBUTE)
    }
}
