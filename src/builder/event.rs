//! Builder for declaring events.

use crate::core::{Phase, PhaseCallbacks};
use crate::runtime::Error;
use std::sync::Arc;

/// Builder for an event's transitions and callbacks.
///
/// Transitions are only checked against the machine's states when the
/// builder is handed to [`MachineBuilder::event`](super::MachineBuilder::event).
pub struct EventBuilder<R> {
    pub(crate) name: String,
    pub(crate) transitions: Vec<(Vec<String>, String)>,
    pub(crate) callbacks: PhaseCallbacks<R>,
}

impl<R> EventBuilder<R> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transitions: Vec::new(),
            callbacks: PhaseCallbacks::new(),
        }
    }

    /// Declare a transition to `to` from each of `from`.
    pub fn transition(mut self, from: &[&str], to: &str) -> Self {
        let from = from.iter().map(|s| s.to_string()).collect();
        self.transitions.push((from, to.to_string()));
        self
    }

    /// Register a callback for `phase`.
    pub fn on<F>(mut self, phase: Phase, callback: F) -> Self
    where
        F: Fn(&mut R) -> Result<(), Error> + Send + Sync + 'static,
    {
        self.callbacks.for_phase_mut(phase).push(Arc::new(callback));
        self
    }

    pub fn pre_validate<F>(self, callback: F) -> Self
    where
        F: Fn(&mut R) -> Result<(), Error> + Send + Sync + 'static,
    {
        self.on(Phase::PreValidate, callback)
    }

    pub fn pre_persist<F>(self, callback: F) -> Self
    where
        F: Fn(&mut R) -> Result<(), Error> + Send + Sync + 'static,
    {
        self.on(Phase::PrePersist, callback)
    }

    pub fn post_persist<F>(self, callback: F) -> Self
    where
        F: Fn(&mut R) -> Result<(), Error> + Send + Sync + 'static,
    {
        self.on(Phase::PostPersist, callback)
    }

    pub fn post_commit<F>(self, callback: F) -> Self
    where
        F: Fn(&mut R) -> Result<(), Error> + Send + Sync + 'static,
    {
        self.on(Phase::PostCommit, callback)
    }
}
