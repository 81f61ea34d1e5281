//! Per-record, per-attribute transition management.

use crate::core::{Event, MachineDefinition, MachineSet};
use crate::runtime::error::Error;
use crate::runtime::record::StatefulRecord;
use crate::runtime::state_runtime::QueuedEvent;
use std::sync::Arc;
use tracing::debug;

/// Handle over one machine of one record.
///
/// The manager is `Idle` until [`request_transition`](Self::request_transition)
/// speculatively writes a target state, then `Pending` until the event is
/// either confirmed for persistence ([`confirm_and_drain`](Self::confirm_and_drain))
/// or [`revert`](Self::revert)ed. Its state lives in the record's
/// [`StateRuntime`](crate::runtime::StateRuntime); the handle only borrows it.
pub struct TransitionManager<'r, R: StatefulRecord> {
    record: &'r mut R,
    machines: Arc<MachineSet<R>>,
    index: usize,
}

impl<'r, R: StatefulRecord> TransitionManager<'r, R> {
    /// Manager for the machine on `attribute`.
    pub fn new(record: &'r mut R, attribute: &str) -> Result<Self, Error> {
        let machines = Arc::clone(record.state_runtime().machines());
        let index = machines.position(attribute)?;
        Ok(Self {
            record,
            machines,
            index,
        })
    }

    pub(crate) fn at(record: &'r mut R, index: usize) -> Self {
        let machines = Arc::clone(record.state_runtime().machines());
        Self {
            record,
            machines,
            index,
        }
    }

    pub fn machine(&self) -> &MachineDefinition<R> {
        &self.machines.machines()[self.index]
    }

    /// Current in-memory value of the attribute.
    pub fn state(&self) -> Option<String> {
        self.record.read_state(self.machine().attribute())
    }

    /// The state transitions are evaluated against.
    pub fn source_state(&self) -> Option<String> {
        source_state(&*self.record, self.index)
    }

    pub fn pending_event(&self) -> Option<&Arc<Event<R>>> {
        self.record.state_runtime().slot(self.index).pending.as_ref()
    }

    pub fn requested_event(&self) -> Option<&str> {
        self.record
            .state_runtime()
            .slot(self.index)
            .requested_event
            .as_deref()
    }

    /// Set the raw event-request value. It is turned into a transition
    /// request when the record is next validated.
    pub fn set_requested_event(&mut self, event: Option<String>) {
        self.record.state_runtime_mut().slot_mut(self.index).requested_event = event;
    }

    /// Pure check against the source state; unknown events are never allowed.
    pub fn may_transition(&self, event: &str) -> bool {
        may_transition(&*self.record, self.index, event)
    }

    /// Speculatively apply `event`.
    ///
    /// Returns `Ok(false)` without touching the record when the event does
    /// not transition from the source state.
    pub fn request_transition(&mut self, event: &str) -> Result<bool, Error> {
        let machines = Arc::clone(&self.machines);
        let machine = &machines.machines()[self.index];
        let event = Arc::clone(machine.find_event(event)?);
        let source = self.source_state();

        if !event.allowed_from(source.as_deref()) {
            debug!(
                attribute = machine.attribute(),
                event = event.name(),
                from = ?source,
                "transition not allowed"
            );
            return Ok(false);
        }

        let target = event.future_state(source.as_deref())?.to_string();
        debug!(
            attribute = machine.attribute(),
            event = event.name(),
            from = ?source,
            to = %target,
            "transition requested"
        );
        self.record
            .write_state(machine.attribute(), Some(target));

        let slot = self.record.state_runtime_mut().slot_mut(self.index);
        slot.state_before = source;
        slot.requested_event = None;
        slot.pending = Some(event);
        Ok(true)
    }

    /// Undo a pending transition: restore the attribute and re-arm the
    /// event request so the failed request stays visible.
    ///
    /// Returns whether anything was pending.
    pub fn revert(&mut self) -> bool {
        let machines = Arc::clone(&self.machines);
        let attribute = machines.machines()[self.index].attribute();

        let slot = self.record.state_runtime_mut().slot_mut(self.index);
        let Some(event) = slot.pending.take() else {
            return false;
        };
        let before = slot.state_before.take();
        slot.requested_event = Some(event.name().to_string());

        debug!(attribute, event = event.name(), to = ?before, "transition reverted");
        self.record.write_state(attribute, before);
        true
    }

    /// Hand the pending event over to persistence and return to idle.
    pub fn confirm_and_drain(&mut self) -> Option<Arc<Event<R>>> {
        self.drain_pending(0).map(|queued| queued.event)
    }

    pub(crate) fn drain_pending(&mut self, scope: u64) -> Option<QueuedEvent<R>> {
        let to = self.state();
        let slot = self.record.state_runtime_mut().slot_mut(self.index);
        let event = slot.pending.take()?;
        let from = slot.state_before.take();
        Some(QueuedEvent {
            scope,
            machine: self.index,
            event,
            from,
            to,
        })
    }
}

/// Last persisted value for stored records, in-memory value for new ones.
/// While a transition is pending, the value captured before it was applied.
pub(crate) fn source_state<R: StatefulRecord>(record: &R, index: usize) -> Option<String> {
    let runtime = record.state_runtime();
    let slot = runtime.slot(index);
    if slot.pending.is_some() {
        return slot.state_before.clone();
    }

    let attribute = runtime.machines().machines()[index].attribute();
    if record.is_new_record() {
        record.read_state(attribute)
    } else {
        record.persisted_state(attribute)
    }
}

pub(crate) fn may_transition<R: StatefulRecord>(record: &R, index: usize, event: &str) -> bool {
    let source = source_state(record, index);
    record.state_runtime().machines().machines()[index]
        .find_event(event)
        .is_ok_and(|e| e.allowed_from(source.as_deref()))
}
