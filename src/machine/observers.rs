//! Observer callbacks notified on every committed transition.

use crate::core::{StateChange, StateId};
use std::fmt;

/// Handle returned by [`Observers::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Callback<Id> = Box<dyn FnMut(&StateChange<Id>)>;

/// Ordered list of callbacks, invoked synchronously in subscription order.
pub struct Observers<Id: StateId> {
    callbacks: Vec<(ObserverId, Callback<Id>)>,
    next_id: u64,
}

impl<Id: StateId> Default for Observers<Id> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Id: StateId> Observers<Id> {
    pub fn new() -> Self {
        Self {
            callbacks: Vec::new(),
            next_id: 0,
        }
    }

    pub fn subscribe<F>(&mut self, callback: F) -> ObserverId
    where
        F: FnMut(&StateChange<Id>) + 'static,
    {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    /// Remove a callback. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(existing, _)| *existing != id);
        self.callbacks.len() != before
    }

    pub fn notify(&mut self, change: &StateChange<Id>) {
        for (_, callback) in &mut self.callbacks {
            callback(change);
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl<Id: StateId> fmt::Debug for Observers<Id> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("len", &self.callbacks.len())
            .finish()
    }
}
