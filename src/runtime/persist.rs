//! Save driver for hosts that expose their storage through [`Persistence`].

use crate::runtime::error::Error;
use crate::runtime::hooks;
use crate::runtime::manager::{self, TransitionManager};
use crate::runtime::record::{StatefulRecord, ValidationError};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Storage operations the save driver needs from a host record.
pub trait Persistence: StatefulRecord {
    /// Host validation rules. All violations are collected in one pass.
    fn validate(&self) -> Validation<(), NonEmptyVec<ValidationError>> {
        Validation::success(())
    }

    /// Physical write. On success the written values become the persisted
    /// values and the record is no longer new.
    fn write(&mut self) -> Result<(), Error>;

    /// Commit the transaction opened by the outermost save.
    fn commit(&mut self) -> Result<(), Error>;

    /// Roll back the transaction opened by the outermost save.
    fn rollback(&mut self) {}
}

/// Save the record, returning `Ok(false)` when validation fails.
///
/// Storage and callback failures are returned as errors. When called from
/// a post-persist callback the save is nested: it writes, but its
/// post-commit callbacks wait for the outermost save.
pub fn save<R: Persistence>(record: &mut R) -> Result<bool, Error> {
    record.errors_mut().clear();

    if let Err(err) = hooks::on_pre_validate(record) {
        hooks::revert_all(record);
        return Err(err);
    }
    if let Validation::Failure(errors) = record.validate() {
        for error in errors.iter() {
            record.errors_mut().push(error.clone());
        }
    }
    if !hooks::on_validated(record) {
        return Ok(false);
    }

    let scope = match hooks::on_pre_persist(record) {
        Ok(scope) => scope,
        Err(err) => {
            if !record.state_runtime().in_persist() {
                record.rollback();
            }
            return Err(err);
        }
    };

    let persisted = record
        .write()
        .and_then(|()| hooks::on_post_persist(record, &scope));
    if let Err(err) = persisted {
        let outermost = scope.is_outermost();
        hooks::on_abort(record, scope);
        if outermost {
            record.rollback();
        }
        return Err(err);
    }

    if scope.is_outermost() {
        if let Err(err) = record.commit() {
            hooks::on_abort(record, scope);
            record.rollback();
            return Err(err);
        }
        hooks::on_post_commit(record, scope)?;
    } else {
        hooks::on_nested_complete(record, scope)?;
    }
    Ok(true)
}

/// Save the record, failing with [`Error::RecordInvalid`] when validation fails.
pub fn save_strict<R: Persistence>(record: &mut R) -> Result<(), Error> {
    if save(record)? {
        Ok(())
    } else {
        Err(Error::RecordInvalid {
            errors: record.errors().clone(),
        })
    }
}

/// Request `event` on `attribute` and save.
///
/// An event that cannot fire from the source state fails validation with
/// an `invalid_transition` error on `<attribute>_event`.
pub fn fire<R: Persistence>(record: &mut R, attribute: &str, event: &str) -> Result<bool, Error> {
    let mut manager = TransitionManager::new(record, attribute)?;
    manager.machine().find_event(event)?;
    manager.set_requested_event(Some(event.to_string()));
    save(record)
}

/// Request `event` on `attribute` and save, failing with
/// [`Error::TransitionNotFound`] when the event cannot fire and with
/// [`Error::RecordInvalid`] when validation fails.
pub fn fire_strict<R: Persistence>(record: &mut R, attribute: &str, event: &str) -> Result<(), Error> {
    let mut manager = TransitionManager::new(record, attribute)?;
    if !manager.may_transition(event) {
        let source = manager.source_state();
        manager
            .machine()
            .find_event(event)?
            .future_state(source.as_deref())?;
    }
    manager.set_requested_event(Some(event.to_string()));
    save_strict(record)
}

/// Convenience methods for records driven by the save driver.
pub trait RecordExt: Persistence {
    fn save(&mut self) -> Result<bool, Error> {
        save(self)
    }

    fn save_strict(&mut self) -> Result<(), Error> {
        save_strict(self)
    }

    fn fire(&mut self, attribute: &str, event: &str) -> Result<bool, Error> {
        fire(self, attribute, event)
    }

    fn fire_strict(&mut self, attribute: &str, event: &str) -> Result<(), Error> {
        fire_strict(self, attribute, event)
    }

    /// Whether `event` could fire now; unknown machines and events are not.
    fn may_fire(&self, attribute: &str, event: &str) -> bool {
        self.state_runtime()
            .machines()
            .position(attribute)
            .is_ok_and(|index| manager::may_transition(self, index, event))
    }

    fn in_state(&self, attribute: &str, state: &str) -> bool {
        self.read_state(attribute).as_deref() == Some(state)
    }

    /// Evaluate a generated state predicate such as `is_payment_paid`.
    fn is(&self, predicate: &str) -> Option<bool> {
        let machines = self.state_runtime().machines();
        machines
            .predicate(predicate)
            .map(|(attribute, state)| self.in_state(attribute, state))
    }

    /// Raw event-request value of `<attribute>_event`.
    fn state_event(&self, attribute: &str) -> Option<&str> {
        self.state_runtime().requested_event(attribute)
    }

    fn set_state_event(&mut self, attribute: &str, event: Option<&str>) -> Result<(), Error> {
        TransitionManager::new(self, attribute)?.set_requested_event(event.map(str::to_string));
        Ok(())
    }
}

impl<R: Persistence> RecordExt for R {}
