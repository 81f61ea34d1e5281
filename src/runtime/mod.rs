//! Per-instance runtime: the host boundary, transition managers and the
//! callback orchestration of save attempts.
//!
//! # Key Concepts
//!
//! - **StatefulRecord**: what the engine needs from a host record
//! - **TransitionManager**: request, confirm or revert one machine's transition
//! - **Hooks**: phase-scoped callback queues across nested saves
//! - **Persistence**: a ready-made save driver over host storage

mod error;
pub mod hooks;
mod manager;
mod persist;
mod record;
mod state_runtime;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{Error, StorageError};
pub use hooks::PersistScope;
pub use manager::TransitionManager;
pub use persist::{fire, fire_strict, save, save_strict, Persistence, RecordExt};
pub use record::{StatefulRecord, ValidationError, ValidationErrors, INVALID_TRANSITION};
pub use state_runtime::StateRuntime;
