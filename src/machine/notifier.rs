//! Commit-time plumbing shared by both machines: logging, history and
//! observer notification.

use super::error::MachineError;
use super::observers::Observers;
use crate::builder::DefinitionError;
use crate::config::MachineConfig;
use crate::core::{StateChange, StateHistory, StateId, TransitionRecord};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use tracing::{debug, warn};
use uuid::Uuid;

pub(crate) struct Notifier<Id: StateId> {
    machine_id: Uuid,
    label: String,
    pub(crate) observers: Observers<Id>,
    pub(crate) history: StateHistory<Id>,
}

impl<Id: StateId> Notifier<Id> {
    pub(crate) fn new(config: &MachineConfig) -> Self {
        Self {
            machine_id: Uuid::new_v4(),
            label: config.label.clone().unwrap_or_default(),
            observers: Observers::new(),
            history: StateHistory::with_capacity(config.history_capacity),
        }
    }

    pub(crate) fn machine_id(&self) -> Uuid {
        self.machine_id
    }

    /// Record and broadcast a committed change.
    pub(crate) fn commit(&mut self, change: StateChange<Id>, time_in_previous: f64) {
        debug!(
            machine = %self.machine_id,
            label = %self.label,
            kind = %change.kind,
            time_in_previous,
            "state changed: {change}"
        );
        self.history
            .record(TransitionRecord::from_change(&change, time_in_previous));
        self.observers.notify(&change);
    }

    /// Log every definition problem found before the first start. Returns
    /// how many were logged.
    pub(crate) fn report_definition(
        &self,
        result: Validation<(), NonEmptyVec<DefinitionError>>,
    ) -> usize {
        let Validation::Failure(errors) = result else {
            return 0;
        };
        for error in errors.iter() {
            warn!(
                machine = %self.machine_id,
                label = %self.label,
                "invalid machine definition: {error}"
            );
        }
        errors.len()
    }

    /// Log a rejected request and hand the error back to the caller.
    pub(crate) fn report(&self, error: MachineError) -> MachineError {
        warn!(
            machine = %self.machine_id,
            label = %self.label,
            "state machine request rejected: {error}"
        );
        error
    }
}
