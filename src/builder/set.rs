//! Builder for the per-type machine registry.

use crate::builder::error::DefinitionError;
use crate::builder::machine::MachineBuilder;
use crate::core::{MachineDefinition, MachineSet};

/// Collects the machines of one host type.
///
/// Each machine is checked against the ones added before it: two machines
/// sharing a prefix may not declare the same state, since their generated
/// predicates and constants would collide.
pub struct MachineSetBuilder<R> {
    machines: Vec<MachineDefinition<R>>,
}

impl<R> MachineSetBuilder<R> {
    pub fn new() -> Self {
        Self {
            machines: Vec::new(),
        }
    }

    /// Add a machine, in declaration order.
    pub fn machine(mut self, builder: MachineBuilder<R>) -> Result<Self, DefinitionError> {
        if self.machines.iter().any(|m| m.attribute() == builder.attribute()) {
            return Err(DefinitionError::DuplicateMachine {
                attribute: builder.attribute().to_string(),
            });
        }

        let machine = builder.build();
        for state in machine.state_names() {
            let conflict = self
                .machines
                .iter()
                .find(|other| other.prefix() == machine.prefix() && other.is_valid_state(state));
            if let Some(other) = conflict {
                return Err(DefinitionError::StateAlreadyDefined {
                    state: state.to_string(),
                    machine: other.attribute().to_string(),
                });
            }
        }

        self.machines.push(machine);
        Ok(self)
    }

    pub fn build(self) -> MachineSet<R> {
        MachineSet::from_machines(self.machines)
    }
}

impl<R> Default for MachineSetBuilder<R> {
    fn default() -> Self {
        Self::new()
    }
}
