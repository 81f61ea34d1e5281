//! The per-type registry of machines and the surface generated from it.
//!
//! A host type owns exactly one [`MachineSet`], built once through
//! [`MachineSetBuilder`](crate::builder::MachineSetBuilder) and shared by
//! every instance behind an `Arc`. Instead of injecting methods at runtime,
//! the set exposes a typed table of the operations a host should offer
//! ([`MachineSet::surface`]) and dispatch helpers that resolve those
//! generated names back to machines and states.

use crate::core::machine::MachineDefinition;
use crate::runtime::Error;
use serde::{Deserialize, Serialize};

/// Attribute used when a machine is declared without naming one.
pub const DEFAULT_STATE_ATTRIBUTE: &str = "state";

/// Kind of a generated operation.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceKind {
    /// `is_<prefix_><state>() -> bool`
    StatePredicate,
    /// `<PREFIX_>STATE_<STATE>` constant holding the state name.
    StateConstant,
    /// `<event>()` saving and reporting a boolean.
    Event,
    /// `<event>_strict()` saving and failing loudly.
    StrictEvent,
    /// `may_<event>() -> bool`
    MayEvent,
    /// `<attribute>_event` raw event-request accessor.
    EventAttribute,
}

/// One entry of the generated surface.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct SurfaceItem {
    pub name: String,
    pub kind: SurfaceKind,
    pub attribute: String,
    /// State or event the operation refers to.
    pub target: String,
}

/// All machines declared on one host type, in declaration order.
pub struct MachineSet<R> {
    machines: Vec<MachineDefinition<R>>,
}

impl<R> MachineSet<R> {
    pub(crate) fn from_machines(machines: Vec<MachineDefinition<R>>) -> Self {
        Self { machines }
    }

    pub fn machines(&self) -> &[MachineDefinition<R>] {
        &self.machines
    }

    pub fn len(&self) -> usize {
        self.machines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }

    pub(crate) fn position(&self, attribute: &str) -> Result<usize, Error> {
        self.machines
            .iter()
            .position(|m| m.attribute() == attribute)
            .ok_or_else(|| Error::UndefinedMachine {
                attribute: attribute.to_string(),
            })
    }

    pub fn machine(&self, attribute: &str) -> Result<&MachineDefinition<R>, Error> {
        self.position(attribute).map(|i| &self.machines[i])
    }

    /// State names of the machine on `attribute`.
    pub fn states(&self, attribute: &str) -> Result<Vec<&str>, Error> {
        Ok(self.machine(attribute)?.state_names())
    }

    /// Event names of the machine on `attribute`.
    pub fn state_events(&self, attribute: &str) -> Result<Vec<&str>, Error> {
        Ok(self.machine(attribute)?.event_names())
    }

    /// Resolve a generated state constant (`STATE_EMPTY`,
    /// `PAYMENT_STATE_PAID`) to its state name.
    pub fn constant(&self, name: &str) -> Option<&str> {
        self.machines.iter().find_map(|machine| {
            machine
                .states()
                .iter()
                .find(|s| constant_name(machine, s.name()) == name)
                .map(|s| s.name())
        })
    }

    /// Resolve a generated predicate name (`is_empty`, `is_payment_paid`)
    /// to `(attribute, state)`.
    pub fn predicate(&self, name: &str) -> Option<(&str, &str)> {
        self.machines.iter().find_map(|machine| {
            machine
                .states()
                .iter()
                .find(|s| predicate_name(machine, s.name()) == name)
                .map(|s| (machine.attribute(), s.name()))
        })
    }

    /// Table of every operation a host type should expose.
    pub fn surface(&self) -> Vec<SurfaceItem> {
        let mut items = Vec::new();
        for machine in &self.machines {
            let attribute = machine.attribute().to_string();
            for state in machine.states() {
                items.push(SurfaceItem {
                    name: predicate_name(machine, state.name()),
                    kind: SurfaceKind::StatePredicate,
                    attribute: attribute.clone(),
                    target: state.name().to_string(),
                });
                items.push(SurfaceItem {
                    name: constant_name(machine, state.name()),
                    kind: SurfaceKind::StateConstant,
                    attribute: attribute.clone(),
                    target: state.name().to_string(),
                });
            }
            for event in machine.events() {
                let generated = [
                    (event.name().to_string(), SurfaceKind::Event),
                    (format!("{}_strict", event.name()), SurfaceKind::StrictEvent),
                    (format!("may_{}", event.name()), SurfaceKind::MayEvent),
                ];
                for (name, kind) in generated {
                    items.push(SurfaceItem {
                        name,
                        kind,
                        attribute: attribute.clone(),
                        target: event.name().to_string(),
                    });
                }
            }
            items.push(SurfaceItem {
                name: machine.event_attribute(),
                kind: SurfaceKind::EventAttribute,
                attribute: attribute.clone(),
                target: machine.event_attribute(),
            });
        }
        items
    }

    /// [`surface`](Self::surface) as pretty-printed JSON.
    pub fn surface_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(&self.surface())?)
    }
}

fn predicate_name<R>(machine: &MachineDefinition<R>, state: &str) -> String {
    format!("is_{}{}", machine.method_prefix(), state)
}

fn constant_name<R>(machine: &MachineDefinition<R>, state: &str) -> String {
    format!("{}STATE_{}", machine.constant_prefix(), state.to_uppercase())
}
