//! Per-instance engine state.

use crate::core::{Event, MachineSet, StateHistory};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Pending-transition slot of one machine on one record.
pub(crate) struct ManagerSlot<R> {
    pub(crate) pending: Option<Arc<Event<R>>>,
    pub(crate) state_before: Option<String>,
    pub(crate) requested_event: Option<String>,
}

impl<R> ManagerSlot<R> {
    fn empty() -> Self {
        Self {
            pending: None,
            state_before: None,
            requested_event: None,
        }
    }
}

/// An event confirmed for persistence, as held by the callback queues.
pub(crate) struct QueuedEvent<R> {
    pub(crate) scope: u64,
    pub(crate) machine: usize,
    pub(crate) event: Arc<Event<R>>,
    pub(crate) from: Option<String>,
    pub(crate) to: Option<String>,
}

impl<R> Clone for QueuedEvent<R> {
    fn clone(&self) -> Self {
        Self {
            scope: self.scope,
            machine: self.machine,
            event: Arc::clone(&self.event),
            from: self.from.clone(),
            to: self.to.clone(),
        }
    }
}

/// Post-persist queue of one physical write.
pub(crate) struct PersistFrame<R> {
    pub(crate) scope: u64,
    pub(crate) post_persist: VecDeque<QueuedEvent<R>>,
}

/// Engine state owned by exactly one record.
///
/// Holds a pending-transition slot per machine (in declaration order), the
/// post-persist frames of in-flight writes and the commit queue shared by
/// one nested save tree.
///
/// Cloning yields a *fresh* runtime over the same machines: a duplicated
/// record never inherits pending events, queued callbacks or history.
pub struct StateRuntime<R> {
    machines: Arc<MachineSet<R>>,
    slots: Vec<ManagerSlot<R>>,
    pub(crate) frames: Vec<PersistFrame<R>>,
    pub(crate) commit_queue: VecDeque<QueuedEvent<R>>,
    pub(crate) open_scopes: usize,
    pub(crate) next_scope: u64,
    pub(crate) tree: Option<Uuid>,
    pub(crate) history: StateHistory,
}

impl<R> StateRuntime<R> {
    pub fn new(machines: Arc<MachineSet<R>>) -> Self {
        let slots = machines.machines().iter().map(|_| ManagerSlot::empty()).collect();
        Self {
            machines,
            slots,
            frames: Vec::new(),
            commit_queue: VecDeque::new(),
            open_scopes: 0,
            next_scope: 0,
            tree: None,
            history: StateHistory::new(),
        }
    }

    pub fn machines(&self) -> &Arc<MachineSet<R>> {
        &self.machines
    }

    pub(crate) fn slot(&self, index: usize) -> &ManagerSlot<R> {
        &self.slots[index]
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> &mut ManagerSlot<R> {
        &mut self.slots[index]
    }

    fn slot_for(&self, attribute: &str) -> Option<&ManagerSlot<R>> {
        self.machines
            .position(attribute)
            .ok()
            .map(|index| &self.slots[index])
    }

    /// Name of the event speculatively applied to `attribute`, if any.
    pub fn pending_event(&self, attribute: &str) -> Option<&str> {
        self.slot_for(attribute)
            .and_then(|slot| slot.pending.as_ref())
            .map(|event| event.name())
    }

    /// Raw event-request value of `attribute` (`<attribute>_event`).
    pub fn requested_event(&self, attribute: &str) -> Option<&str> {
        self.slot_for(attribute)
            .and_then(|slot| slot.requested_event.as_deref())
    }

    /// Whether a save of this record is in flight.
    pub fn in_persist(&self) -> bool {
        self.open_scopes > 0
    }

    /// Id of the nested save tree in flight, if any.
    pub fn tree_id(&self) -> Option<Uuid> {
        self.tree
    }

    /// Number of events waiting for the commit flush.
    pub fn queued_commits(&self) -> usize {
        self.commit_queue.len()
    }

    /// Transitions persisted by this instance.
    pub fn history(&self) -> &StateHistory {
        &self.history
    }

    /// No pending event, no open save and nothing queued.
    pub fn is_idle(&self) -> bool {
        self.slots.iter().all(|slot| slot.pending.is_none())
            && self.frames.is_empty()
            && self.commit_queue.is_empty()
            && self.open_scopes == 0
    }
}

impl<R> Clone for StateRuntime<R> {
    fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.machines))
    }
}

impl<R> fmt::Debug for StateRuntime<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pending: Vec<Option<&str>> = self
            .slots
            .iter()
            .map(|slot| slot.pending.as_ref().map(|e| e.name()))
            .collect();
        f.debug_struct("StateRuntime")
            .field("pending", &pending)
            .field("frames", &self.frames.len())
            .field("queued_commits", &self.commit_queue.len())
            .field("open_scopes", &self.open_scopes)
            .field("tree", &self.tree)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{EventBuilder, MachineBuilder, MachineSetBuilder};

    fn machines() -> Arc<MachineSet<()>> {
        let set = MachineSetBuilder::new()
            .machine(
                MachineBuilder::default()
                    .initial_state("empty")
                    .unwrap()
                    .state("filled")
                    .unwrap()
                    .event(EventBuilder::new("pack").transition(&["empty"], "filled"))
                    .unwrap(),
            )
            .unwrap()
            .build();
        Arc::new(set)
    }

    #[test]
    fn new_runtime_is_idle() {
        let runtime = StateRuntime::new(machines());
        assert!(runtime.is_idle());
        assert!(!runtime.in_persist());
        assert_eq!(runtime.pending_event("state"), None);
        assert_eq!(runtime.requested_event("missing"), None);
    }

    #[test]
    fn clone_starts_fresh() {
        let machines = machines();
        let mut runtime = StateRuntime::new(Arc::clone(&machines));
        let pack = Arc::clone(machines.machine("state").unwrap().find_event("pack").unwrap());
        runtime.slot_mut(0).pending = Some(pack);
        runtime.slot_mut(0).requested_event = Some("pack".to_string());
        runtime.open_scopes = 1;

        let copy = runtime.clone();
        assert_eq!(runtime.pending_event("state"), Some("pack"));
        assert!(copy.is_idle());
        assert_eq!(copy.pending_event("state"), None);
        assert_eq!(copy.requested_event("state"), None);
        assert!(Arc::ptr_eq(copy.machines(), runtime.machines()));
    }
}
