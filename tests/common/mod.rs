//! In-memory parcel record shared by the integration tests.
#![allow(dead_code)]

use recordfsm::builder::{EventBuilder, MachineBuilder, MachineSetBuilder};
use recordfsm::runtime::{fire_strict, hooks, ValidationError, ValidationErrors};
use recordfsm::{
    DefinitionError, Error, MachineSet, Persistence, Phase, StateRuntime, StatefulRecord,
};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Event whose callbacks append `"<phase> <event>"` to the parcel's trace.
fn traced(name: &str, from: &[&str], to: &str) -> EventBuilder<Parcel> {
    let mut event = EventBuilder::new(name).transition(from, to);
    for phase in Phase::ALL {
        let label = format!("{phase} {name}");
        event = event.on(phase, move |parcel: &mut Parcel| {
            parcel.trace.push(label.clone());
            Ok(())
        });
    }
    event
}

fn define() -> Result<MachineSet<Parcel>, DefinitionError> {
    let shipping = MachineBuilder::default()
        .initial_state("empty")?
        .state("filled")?
        .state("shipped")?
        .state("lost")?
        .event(traced("pack", &["empty"], "filled"))?
        .event(traced("ship", &["filled"], "shipped"))?
        .event(
            traced("pack_and_ship", &["empty"], "filled")
                .post_persist(|parcel: &mut Parcel| fire_strict(parcel, "state", "ship")),
        )?
        .event(traced("lose", &["empty", "filled"], "lost"))?
        .event(
            traced("jam", &["empty"], "filled")
                .pre_persist(|_: &mut Parcel| Err(Error::callback("conveyor jammed"))),
        )?
        .event(
            traced("seal", &["filled"], "shipped")
                .pre_persist(|_: &mut Parcel| Err(Error::callback("seal torn"))),
        )?
        .event(
            traced("pack_and_seal", &["empty"], "filled")
                .post_persist(|parcel: &mut Parcel| fire_strict(parcel, "state", "seal")),
        )?;

    let payment = MachineBuilder::new("payment_state")
        .prefix("payment")
        .initial_state("pending")?
        .state("paid")?
        .event(traced("pay", &["pending"], "paid"))?
        .event(
            traced("checkout", &["pending"], "paid")
                .post_persist(|parcel: &mut Parcel| fire_strict(parcel, "state", "pack")),
        )?;

    Ok(MachineSetBuilder::new()
        .machine(shipping)?
        .machine(payment)?
        .build())
}

pub fn machines() -> Arc<MachineSet<Parcel>> {
    static MACHINES: OnceLock<Arc<MachineSet<Parcel>>> = OnceLock::new();
    Arc::clone(MACHINES.get_or_init(|| Arc::new(define().expect("parcel machines are valid"))))
}

#[derive(Clone)]
pub struct Parcel {
    runtime: StateRuntime<Parcel>,
    pub weight: Option<u32>,
    state: Option<String>,
    payment_state: Option<String>,
    persisted: HashMap<String, Option<String>>,
    new_record: bool,
    errors: ValidationErrors,
    pub commits: usize,
    pub rollbacks: usize,
    pub fail_write: bool,
    pub fail_commit: bool,
    pub trace: Vec<String>,
}

recordfsm::state_accessors! {
    impl Parcel for "state" {
        state is_empty => "empty";
        state is_filled => "filled";
        state is_shipped => "shipped";
        event pack, pack_strict, may_pack => "pack";
        event ship, ship_strict, may_ship => "ship";
        event pack_and_ship, pack_and_ship_strict, may_pack_and_ship => "pack_and_ship";
    }
    impl Parcel for "payment_state" {
        state is_payment_pending => "pending";
        state is_payment_paid => "paid";
        event pay, pay_strict, may_pay => "pay";
        event checkout, checkout_strict, may_checkout => "checkout";
    }
}

impl Parcel {
    pub fn new() -> Self {
        let mut parcel = Self {
            runtime: StateRuntime::new(machines()),
            weight: None,
            state: None,
            payment_state: None,
            persisted: HashMap::new(),
            new_record: true,
            errors: ValidationErrors::new(),
            commits: 0,
            rollbacks: 0,
            fail_write: false,
            fail_commit: false,
            trace: Vec::new(),
        };
        hooks::after_initialize(&mut parcel);
        parcel
    }

    pub fn with_weight(weight: u32) -> Self {
        Self {
            weight: Some(weight),
            ..Self::new()
        }
    }

    /// A parcel loaded from storage in `state`.
    pub fn stored(state: &str, weight: u32) -> Self {
        let mut parcel = Self::with_weight(weight);
        parcel.state = Some(state.to_string());
        parcel.new_record = false;
        parcel.persisted = parcel.snapshot();
        parcel
    }

    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    pub fn payment_state(&self) -> Option<&str> {
        self.payment_state.as_deref()
    }

    /// Assign the attribute without any transition, like a raw form write.
    pub fn set_state(&mut self, state: &str) {
        self.state = Some(state.to_string());
    }

    pub fn trace(&self) -> Vec<&str> {
        self.trace.iter().map(String::as_str).collect()
    }

    fn snapshot(&self) -> HashMap<String, Option<String>> {
        HashMap::from([
            ("state".to_string(), self.state.clone()),
            ("payment_state".to_string(), self.payment_state.clone()),
        ])
    }
}

impl StatefulRecord for Parcel {
    fn state_runtime(&self) -> &StateRuntime<Self> {
        &self.runtime
    }

    fn state_runtime_mut(&mut self) -> &mut StateRuntime<Self> {
        &mut self.runtime
    }

    fn read_state(&self, attribute: &str) -> Option<String> {
        match attribute {
            "state" => self.state.clone(),
            "payment_state" => self.payment_state.clone(),
            _ => None,
        }
    }

    fn write_state(&mut self, attribute: &str, value: Option<String>) {
        match attribute {
            "state" => self.state = value,
            "payment_state" => self.payment_state = value,
            _ => {}
        }
    }

    fn persisted_state(&self, attribute: &str) -> Option<String> {
        self.persisted.get(attribute).cloned().flatten()
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

impl Persistence for Parcel {
    fn validate(&self) -> Validation<(), NonEmptyVec<ValidationError>> {
        let needs_weight = matches!(self.state.as_deref(), Some("filled" | "shipped"));
        if needs_weight && self.weight.is_none() {
            Validation::fail(ValidationError::new("weight", "blank"))
        } else {
            Validation::success(())
        }
    }

    fn write(&mut self) -> Result<(), Error> {
        if self.fail_write {
            return Err(Error::storage("disk full"));
        }
        self.persisted = self.snapshot();
        self.new_record = false;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), Error> {
        if self.fail_commit {
            return Err(Error::storage("connection lost"));
        }
        self.commits += 1;
        Ok(())
    }

    fn rollback(&mut self) {
        self.rollbacks += 1;
    }
}
