//! Minimal in-memory record for unit tests.

use crate::builder::{EventBuilder, MachineBuilder, MachineSetBuilder};
use crate::core::{MachineSet, Phase};
use crate::runtime::error::Error;
use crate::runtime::hooks::after_initialize;
use crate::runtime::manager::TransitionManager;
use crate::runtime::persist::Persistence;
use crate::runtime::record::{StatefulRecord, ValidationErrors};
use crate::runtime::state_runtime::StateRuntime;
use std::sync::Arc;

fn traced(name: &str, from: &[&str], to: &str) -> EventBuilder<Crate> {
    let mut event = EventBuilder::new(name).transition(from, to);
    for phase in Phase::ALL {
        let label = format!("{phase} {name}");
        event = event.on(phase, move |record: &mut Crate| {
            record.trace.push(label.clone());
            Ok(())
        });
    }
    event
}

pub(crate) fn machines() -> Arc<MachineSet<Crate>> {
    let machine = MachineBuilder::default()
        .initial_state("empty")
        .and_then(|m| m.state("filled"))
        .and_then(|m| m.state("shipped"))
        .and_then(|m| m.event(traced("pack", &["empty"], "filled")))
        .and_then(|m| m.event(traced("ship", &["filled"], "shipped")))
        .unwrap();
    Arc::new(MachineSetBuilder::new().machine(machine).unwrap().build())
}

pub(crate) struct Crate {
    runtime: StateRuntime<Crate>,
    state: Option<String>,
    persisted: Option<String>,
    new_record: bool,
    errors: ValidationErrors,
    pub(crate) trace: Vec<String>,
}

impl Crate {
    pub(crate) fn new() -> Self {
        let mut record = Self {
            runtime: StateRuntime::new(machines()),
            state: None,
            persisted: None,
            new_record: true,
            errors: ValidationErrors::new(),
            trace: Vec::new(),
        };
        after_initialize(&mut record);
        record
    }

    pub(crate) fn stored(state: &str) -> Self {
        Self {
            runtime: StateRuntime::new(machines()),
            state: Some(state.to_string()),
            persisted: Some(state.to_string()),
            new_record: false,
            errors: ValidationErrors::new(),
            trace: Vec::new(),
        }
    }

    pub(crate) fn request(&mut self, event: &str) {
        TransitionManager::new(self, "state")
            .unwrap()
            .set_requested_event(Some(event.to_string()));
    }

    pub(crate) fn mark_written(&mut self) {
        self.persisted = self.state.clone();
        self.new_record = false;
    }
}

pub(crate) fn trace_of(record: &Crate) -> Vec<&str> {
    record.trace.iter().map(String::as_str).collect()
}

impl StatefulRecord for Crate {
    fn state_runtime(&self) -> &StateRuntime<Self> {
        &self.runtime
    }

    fn state_runtime_mut(&mut self) -> &mut StateRuntime<Self> {
        &mut self.runtime
    }

    fn read_state(&self, _attribute: &str) -> Option<String> {
        self.state.clone()
    }

    fn write_state(&mut self, _attribute: &str, value: Option<String>) {
        self.state = value;
    }

    fn persisted_state(&self, _attribute: &str) -> Option<String> {
        self.persisted.clone()
    }

    fn is_new_record(&self) -> bool {
        self.new_record
    }

    fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    fn errors_mut(&mut self) -> &mut ValidationErrors {
        &mut self.errors
    }
}

impl Persistence for Crate {
    fn write(&mut self) -> Result<(), Error> {
        self.mark_written();
        Ok(())
    }

    fn commit(&mut self) -> Result<(), Error> {
        Ok(())
    }
}
