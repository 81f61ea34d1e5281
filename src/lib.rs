//! Recordfsm: declarative state machines for persisted records
//!
//! A host type declares named states and events on one or more attributes.
//! Requesting an event speculatively writes the target state; the next save
//! either confirms it or reverts it, and runs the event's callbacks at the
//! right points of the save lifecycle.
//!
//! # Core Concepts
//!
//! - **Machine definitions**: states, events and transition tables per attribute,
//!   validated once when the host type declares them
//! - **Transition managers**: per record and attribute, the pending event and the
//!   state it replaced
//! - **Phases**: pre-validate, pre-persist, post-persist and post-commit callbacks
//! - **Nested saves**: a post-persist callback may fire another event; all
//!   post-commit callbacks of the nested tree run once, in registration order,
//!   after the outermost commit
//!
//! # Example
//!
//! ```rust
//! use recordfsm::builder::{EventBuilder, MachineBuilder, MachineSetBuilder};
//!
//! let machines = MachineSetBuilder::<()>::new()
//!     .machine(
//!         MachineBuilder::default()
//!             .initial_state("empty")?
//!             .state("filled")?
//!             .state("shipped")?
//!             .event(EventBuilder::new("pack").transition(&["empty"], "filled"))?
//!             .event(EventBuilder::new("ship").transition(&["filled"], "shipped"))?,
//!     )?
//!     .build();
//!
//! assert_eq!(machines.states("state")?, vec!["empty", "filled", "shipped"]);
//! assert_eq!(machines.constant("STATE_FILLED"), Some("filled"));
//!
//! let ship = machines.machine("state")?.find_event("ship")?;
//! assert_eq!(
//!     ship.future_state(Some("empty")).unwrap_err().to_string(),
//!     "ship does not transition from empty; defined are [filled -> shipped]"
//! );
//! # Ok::<(), recordfsm::runtime::Error>(())
//! ```

pub mod builder;
pub mod core;
pub mod runtime;

// Re-export commonly used types
pub use builder::{DefinitionError, EventBuilder, MachineBuilder, MachineSetBuilder};
pub use crate::core::{Event, MachineDefinition, MachineSet, Phase, State, Transition};
pub use runtime::{Error, Persistence, RecordExt, StateRuntime, StatefulRecord, TransitionManager};
