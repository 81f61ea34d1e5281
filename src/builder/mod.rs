//! Builder API for declaring machines.
//!
//! This module provides fluent builders that enforce every definition-time
//! invariant, and a macro that turns declared states and events into
//! methods on a host type.

pub mod error;
pub mod event;
pub mod machine;
pub mod macros;
pub mod set;

pub use error::DefinitionError;
pub use event::EventBuilder;
pub use machine::MachineBuilder;
pub use set::MachineSetBuilder;

/// Create an event without callbacks that moves from each of `from` to `to`.
///
/// # Example
///
/// ```
/// use recordfsm::builder::{simple_event, MachineBuilder};
///
/// let machine = MachineBuilder::<()>::default()
///     .initial_state("draft")?
///     .state("published")?
///     .event(simple_event("publish", &["draft"], "published"))?
///     .build();
///
/// assert!(machine.find_event("publish")?.allowed_from(Some("draft")));
/// # Ok::<(), recordfsm::runtime::Error>(())
/// ```
pub fn simple_event<R>(name: &str, from: &[&str], to: &str) -> EventBuilder<R> {
    EventBuilder::new(name).transition(from, to)
}
