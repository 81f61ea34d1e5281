//! Definition-time errors raised while declaring machines.

use thiserror::Error;

/// Errors that can occur when declaring states, events and machines.
///
/// These are always returned to the code configuring the machine; a host
/// type whose definition fails to build has no usable machine set.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DefinitionError {
    #[error("'{state}' is not a valid state of the '{attribute}' state machine (event '{event}')")]
    UndefinedState {
        attribute: String,
        event: String,
        state: String,
    },

    #[error("{event} already defines a transition from {from} (to {to})")]
    ExistingTransition {
        event: String,
        from: String,
        to: String,
    },

    #[error("{event} declares a transition to {to} without any source state")]
    EmptyTransition { event: String, to: String },

    #[error("State '{state}' is already declared in the '{attribute}' state machine")]
    DuplicateState { attribute: String, state: String },

    #[error("Event '{event}' is already declared in the '{attribute}' state machine")]
    DuplicateEvent { attribute: String, event: String },

    #[error("A state machine for '{attribute}' is already declared")]
    DuplicateMachine { attribute: String },

    #[error("State '{state}' has already been defined in the '{machine}' state machine. Use a prefix to avoid that")]
    StateAlreadyDefined { state: String, machine: String },

    #[error("The '{attribute}' state machine declares more than one initial state ('{first}' and '{second}')")]
    MultipleInitialStates {
        attribute: String,
        first: String,
        second: String,
    },
}
