//! Id-keyed storage for registered states.

use super::error::MachineError;
use crate::core::StateId;
use std::collections::HashMap;

/// Exclusive owner of every state instance registered under an id.
///
/// The first registration of an id wins; later ones are rejected.
pub(crate) struct StateRegistry<Id: StateId, T> {
    states: HashMap<Id, T>,
}

impl<Id: StateId, T> StateRegistry<Id, T> {
    pub(crate) fn new() -> Self {
        Self {
            states: HashMap::new(),
        }
    }

    /// Store `state` under `id`, returning it for post-registration setup.
    pub(crate) fn insert(&mut self, id: Id, state: T) -> Result<&mut T, MachineError> {
        if self.states.contains_key(&id) {
            return Err(MachineError::DuplicateState {
                id: id.name().to_string(),
            });
        }
        Ok(self.states.entry(id).or_insert(state))
    }

    pub(crate) fn get(&self, id: &Id) -> Option<&T> {
        self.states.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &Id) -> Option<&mut T> {
        self.states.get_mut(id)
    }

    pub(crate) fn contains(&self, id: &Id) -> bool {
        self.states.contains_key(id)
    }

    pub(crate) fn ids(&self) -> impl Iterator<Item = &Id> {
        self.states.keys()
    }

    pub(crate) fn len(&self) -> usize {
        self.states.len()
    }
}

pub(crate) fn unknown<Id: StateId>(id: &Id) -> MachineError {
    MachineError::UnknownState {
        id: id.name().to_string(),
    }
}
