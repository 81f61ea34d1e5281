//! Events: a transition table plus phase-scoped callbacks.

use crate::core::transition::{format_transitions, Transition};
use crate::runtime::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Lifecycle point at which an event's callbacks run.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Runs immediately while the save validates; may add validation errors.
    PreValidate,
    /// Runs right before the physical write.
    PrePersist,
    /// Runs right after the physical write. May save the record again.
    PostPersist,
    /// Runs once, after the outermost save committed.
    PostCommit,
}

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::PreValidate,
        Phase::PrePersist,
        Phase::PostPersist,
        Phase::PostCommit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::PreValidate => "pre_validate",
            Phase::PrePersist => "pre_persist",
            Phase::PostPersist => "post_persist",
            Phase::PostCommit => "post_commit",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Side effect attached to an event phase.
///
/// Callbacks receive the record explicitly and may do anything the host
/// allows, including firing another event (which saves the record again).
pub type Callback<R> = Arc<dyn Fn(&mut R) -> Result<(), Error> + Send + Sync>;

/// Callbacks of one event, grouped by phase and kept in registration order.
pub(crate) struct PhaseCallbacks<R> {
    pub(crate) pre_validate: Vec<Callback<R>>,
    pub(crate) pre_persist: Vec<Callback<R>>,
    pub(crate) post_persist: Vec<Callback<R>>,
    pub(crate) post_commit: Vec<Callback<R>>,
}

impl<R> PhaseCallbacks<R> {
    pub(crate) fn new() -> Self {
        Self {
            pre_validate: Vec::new(),
            pre_persist: Vec::new(),
            post_persist: Vec::new(),
            post_commit: Vec::new(),
        }
    }

    pub(crate) fn for_phase(&self, phase: Phase) -> &[Callback<R>] {
        match phase {
            Phase::PreValidate => &self.pre_validate,
            Phase::PrePersist => &self.pre_persist,
            Phase::PostPersist => &self.post_persist,
            Phase::PostCommit => &self.post_commit,
        }
    }

    pub(crate) fn for_phase_mut(&mut self, phase: Phase) -> &mut Vec<Callback<R>> {
        match phase {
            Phase::PreValidate => &mut self.pre_validate,
            Phase::PrePersist => &mut self.pre_persist,
            Phase::PostPersist => &mut self.post_persist,
            Phase::PostCommit => &mut self.post_commit,
        }
    }
}

/// A named event of a machine.
///
/// Events are frozen once their machine is built; they are shared through
/// `Arc` by the definition and by the callback queues of every instance.
pub struct Event<R> {
    name: String,
    transitions: Vec<Transition>,
    callbacks: PhaseCallbacks<R>,
}

impl<R> Event<R> {
    pub(crate) fn from_parts(
        name: String,
        transitions: Vec<Transition>,
        callbacks: PhaseCallbacks<R>,
    ) -> Self {
        Self {
            name,
            transitions,
            callbacks,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Transition table in declaration order.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    fn find_transition_from(&self, state: &str) -> Option<&Transition> {
        self.transitions.iter().find(|t| t.from == state)
    }

    /// Whether this event declares a transition out of `state` (pure).
    ///
    /// An unset state never matches.
    pub fn allowed_from(&self, state: Option<&str>) -> bool {
        state.is_some_and(|s| self.find_transition_from(s).is_some())
    }

    /// Target of the transition out of `state`.
    pub fn future_state(&self, state: Option<&str>) -> Result<&str, Error> {
        state
            .and_then(|s| self.find_transition_from(s))
            .map(|t| t.to.as_str())
            .ok_or_else(|| Error::TransitionNotFound {
                event: self.name.clone(),
                state: state.unwrap_or_default().to_string(),
                defined: format_transitions(&self.transitions),
            })
    }

    /// Number of callbacks registered for `phase`.
    pub fn callback_count(&self, phase: Phase) -> usize {
        self.callbacks.for_phase(phase).len()
    }

    /// Run every callback of `phase` in registration order, stopping at the
    /// first error.
    pub fn run_phase(&self, phase: Phase, record: &mut R) -> Result<(), Error> {
        let callbacks = self.callbacks.for_phase(phase);
        tracing::trace!(event = %self.name, %phase, count = callbacks.len(), "running event callbacks");
        for callback in callbacks {
            callback(record)?;
        }
        Ok(())
    }
}

impl<R> fmt::Debug for Event<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("name", &self.name)
            .field("transitions", &self.transitions)
            .finish_non_exhaustive()
    }
}
