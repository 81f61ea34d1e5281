//! Immutable definition values.
//!
//! This module contains everything that is shared, read-only, by all
//! instances of a host type:
//! - States and transition tables
//! - Events with their phase-scoped callbacks
//! - Machine definitions and the per-type registry
//! - The transition history value kept per instance

mod event;
mod history;
mod machine;
mod registry;
mod state;
mod transition;

pub use event::{Callback, Event, Phase};
pub(crate) use event::PhaseCallbacks;
pub use history::{StateHistory, StateTransition};
pub use machine::{MachineDefinition, EVENT_ATTRIBUTE_SUFFIX};
pub use registry::{MachineSet, SurfaceItem, SurfaceKind, DEFAULT_STATE_ATTRIBUTE};
pub use state::State;
pub use transition::Transition;
