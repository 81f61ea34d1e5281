//! Lifecycle hooks: queueing and flushing of phase-scoped callbacks.
//!
//! A host drives one save attempt through these hooks in a fixed order:
//!
//! ```text
//! on_pre_validate -> (host validation) -> on_validated
//!     -> on_pre_persist -> (physical write) -> on_post_persist
//!     -> outermost: (commit) -> on_post_commit
//!        nested:    on_nested_complete
//!     on failure after on_pre_persist: on_abort
//! ```
//!
//! A post-persist callback may save the record again; that nested attempt
//! runs the same protocol on top of the outer one. Pre- and post-persist
//! queues belong to one physical write, while post-commit entries of the
//! whole nested tree share one queue flushed by the outermost attempt.
//! [`save`](crate::runtime::save) wires all of this for [`Persistence`]
//! hosts.
//!
//! [`Persistence`]: crate::runtime::Persistence

use crate::core::{Phase, StateTransition};
use crate::runtime::error::Error;
use crate::runtime::manager::TransitionManager;
use crate::runtime::record::{StatefulRecord, INVALID_TRANSITION};
use crate::runtime::state_runtime::{PersistFrame, QueuedEvent};
use chrono::Utc;
use std::collections::VecDeque;
use std::mem;
use std::sync::Arc;
use tracing::{debug, trace, warn};
use uuid::Uuid;

/// Token for one physical write, from `on_pre_persist` until it is
/// finished by exactly one of `on_post_commit`, `on_nested_complete` or
/// `on_abort`.
#[derive(Debug)]
#[must_use = "a persist scope must be finished or aborted"]
pub struct PersistScope {
    id: u64,
    tree: Uuid,
    outermost: bool,
    depth: usize,
}

impl PersistScope {
    /// Whether this write is the root of its save tree and must commit.
    pub fn is_outermost(&self) -> bool {
        self.outermost
    }

    /// Nesting level, 1 for the outermost write.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Id shared by every write of the same save tree.
    pub fn tree_id(&self) -> Uuid {
        self.tree
    }
}

fn machine_count<R: StatefulRecord>(record: &R) -> usize {
    record.state_runtime().machines().len()
}

/// Write the initial state into every unset attribute of a new record.
pub fn after_initialize<R: StatefulRecord>(record: &mut R) {
    if !record.is_new_record() {
        return;
    }
    let machines = Arc::clone(record.state_runtime().machines());
    for machine in machines.machines() {
        let Some(initial) = machine.initial_state() else {
            continue;
        };
        if record.read_state(machine.attribute()).is_none() {
            record.write_state(machine.attribute(), Some(initial.name().to_string()));
        }
    }
}

/// Turn raw event requests into transitions and run the pre-validate
/// callbacks of every pending event.
///
/// A request that cannot fire from the source state is reported as
/// [`INVALID_TRANSITION`] on `<attribute>_event` and left in place.
pub fn on_pre_validate<R: StatefulRecord>(record: &mut R) -> Result<(), Error> {
    let count = machine_count(record);

    for index in 0..count {
        let mut manager = TransitionManager::at(record, index);
        let Some(requested) = manager.requested_event().map(str::to_string) else {
            continue;
        };
        if !manager.request_transition(&requested)? {
            let key = manager.machine().event_attribute();
            record.errors_mut().add(key, INVALID_TRANSITION);
        }
    }

    let pending: Vec<_> = (0..count)
        .filter_map(|index| record.state_runtime().slot(index).pending.clone())
        .collect();
    for event in pending {
        event.run_phase(Phase::PreValidate, record)?;
    }
    Ok(())
}

/// Conclude validation. With errors present every pending transition is
/// reverted and `false` is returned; nothing gets queued.
pub fn on_validated<R: StatefulRecord>(record: &mut R) -> bool {
    if record.errors().is_empty() {
        return true;
    }
    revert_all(record);
    false
}

pub(crate) fn revert_all<R: StatefulRecord>(record: &mut R) {
    for index in 0..machine_count(record) {
        TransitionManager::at(record, index).revert();
    }
}

/// Register pending events for this write and flush its pre-persist queue.
///
/// Events are confirmed in machine declaration order and appended to this
/// write's post-persist queue and to the tree's commit queue. If a
/// pre-persist callback fails, the scope is aborted before returning.
pub fn on_pre_persist<R: StatefulRecord>(record: &mut R) -> Result<PersistScope, Error> {
    let runtime = record.state_runtime();
    if runtime.open_scopes == 0 && !runtime.commit_queue.is_empty() {
        let leaked = runtime.commit_queue.len();
        revert_all(record);
        return Err(Error::OrderingViolation(format!(
            "{leaked} post-commit entries leaked from a previous save"
        )));
    }

    let runtime = record.state_runtime_mut();
    runtime.open_scopes += 1;
    let id = runtime.next_scope;
    runtime.next_scope += 1;
    let scope = PersistScope {
        id,
        tree: *runtime.tree.get_or_insert_with(Uuid::new_v4),
        outermost: runtime.open_scopes == 1,
        depth: runtime.open_scopes,
    };

    let registered: Vec<QueuedEvent<R>> = (0..machine_count(record))
        .filter_map(|index| TransitionManager::at(record, index).drain_pending(id))
        .collect();

    for entry in &registered {
        debug!(
            tree = %scope.tree,
            depth = scope.depth,
            event = entry.event.name(),
            from = ?entry.from,
            to = ?entry.to,
            "event registered for persistence"
        );
    }

    let runtime = record.state_runtime_mut();
    runtime.commit_queue.extend(registered.iter().cloned());
    runtime.frames.push(PersistFrame {
        scope: id,
        post_persist: registered.iter().cloned().collect(),
    });

    let mut pre_persist: VecDeque<QueuedEvent<R>> = registered.into();
    trace!(tree = %scope.tree, count = pre_persist.len(), "flushing pre_persist");
    while let Some(entry) = pre_persist.pop_front() {
        if let Err(err) = entry.event.run_phase(Phase::PrePersist, record) {
            on_abort(record, scope);
            return Err(err);
        }
    }
    Ok(scope)
}

/// Flush the post-persist queue of the write `scope` stands for.
///
/// Each event is recorded in the history before its callbacks run; the
/// callbacks may save the record again.
pub fn on_post_persist<R: StatefulRecord>(record: &mut R, scope: &PersistScope) -> Result<(), Error> {
    let runtime = record.state_runtime_mut();
    let innermost = runtime
        .frames
        .last()
        .is_some_and(|frame| frame.scope == scope.id);
    let Some(frame) = innermost.then(|| runtime.frames.pop()).flatten() else {
        return Err(Error::OrderingViolation(format!(
            "post_persist of depth {} is not the innermost open write",
            scope.depth
        )));
    };

    trace!(tree = %scope.tree, count = frame.post_persist.len(), "flushing post_persist");
    let machines = Arc::clone(record.state_runtime().machines());
    for entry in frame.post_persist {
        let transition = StateTransition {
            attribute: machines.machines()[entry.machine].attribute().to_string(),
            event: entry.event.name().to_string(),
            from: entry.from.clone(),
            to: entry.to.clone().unwrap_or_default(),
            timestamp: Utc::now(),
        };
        let runtime = record.state_runtime_mut();
        runtime.history = runtime.history.record(transition);

        entry.event.run_phase(Phase::PostPersist, record)?;
    }
    Ok(())
}

/// Close the outermost write after the host committed and drain the
/// commit queue of the whole save tree, in registration order.
pub fn on_post_commit<R: StatefulRecord>(record: &mut R, scope: PersistScope) -> Result<(), Error> {
    let runtime = record.state_runtime_mut();
    runtime.open_scopes = runtime.open_scopes.saturating_sub(1);

    if !scope.outermost {
        return Err(Error::OrderingViolation(format!(
            "nested write at depth {} attempted to flush post_commit",
            scope.depth
        )));
    }
    if runtime.open_scopes != 0 || !runtime.frames.is_empty() {
        let open = runtime.open_scopes;
        discard_tree(record);
        return Err(Error::OrderingViolation(format!(
            "post_commit flushed with {open} writes still open"
        )));
    }

    let queue = mem::take(&mut runtime.commit_queue);
    runtime.tree = None;
    debug!(tree = %scope.tree, count = queue.len(), "flushing post_commit");
    for entry in queue {
        entry.event.run_phase(Phase::PostCommit, record)?;
    }
    Ok(())
}

/// Close a nested write. Its post-commit entries stay queued for the
/// outermost write.
pub fn on_nested_complete<R: StatefulRecord>(record: &mut R, scope: PersistScope) -> Result<(), Error> {
    let runtime = record.state_runtime_mut();
    runtime.open_scopes = runtime.open_scopes.saturating_sub(1);

    if scope.outermost {
        discard_tree(record);
        return Err(Error::OrderingViolation(
            "outermost write completed without commit".to_string(),
        ));
    }
    trace!(tree = %scope.tree, depth = scope.depth, "nested write complete");
    Ok(())
}

/// Abandon a write after a failure.
///
/// Events still waiting in this write's post-persist queue (the write itself
/// failed) are reverted like a validation failure. This write's commit
/// entries are dropped; when the outermost write aborts the whole commit
/// queue is dropped.
pub fn on_abort<R: StatefulRecord>(record: &mut R, scope: PersistScope) {
    let runtime = record.state_runtime_mut();
    runtime.open_scopes = runtime.open_scopes.saturating_sub(1);
    runtime.commit_queue.retain(|entry| entry.scope != scope.id);

    let frame = runtime
        .frames
        .iter()
        .position(|frame| frame.scope == scope.id)
        .map(|position| runtime.frames.remove(position));

    if let Some(frame) = frame {
        let machines = Arc::clone(record.state_runtime().machines());
        for entry in frame.post_persist {
            let attribute = machines.machines()[entry.machine].attribute();
            debug!(attribute, event = entry.event.name(), to = ?entry.from, "write failed, transition reverted");
            record.write_state(attribute, entry.from);
            record
                .state_runtime_mut()
                .slot_mut(entry.machine)
                .requested_event = Some(entry.event.name().to_string());
        }
    }

    if scope.outermost {
        discard_tree(record);
    }
}

fn discard_tree<R: StatefulRecord>(record: &mut R) {
    let runtime = record.state_runtime_mut();
    if !runtime.commit_queue.is_empty() {
        warn!(
            tree = ?runtime.tree,
            count = runtime.commit_queue.len(),
            "discarding queued post_commit callbacks"
        );
    }
    runtime.commit_queue.clear();
    runtime.frames.clear();
    runtime.open_scopes = 0;
    runtime.tree = None;
}
