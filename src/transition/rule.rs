//! A single prioritized transition rule.

use crate::core::{Condition, StateId};
use std::fmt;

/// `from -> to` when `condition` holds, ranked by `priority`.
///
/// A rule with `from: None` is an any-state rule: it is a candidate no
/// matter which state is current.
pub struct TransitionRule<Id: StateId, O> {
    pub from: Option<Id>,
    pub to: Id,
    pub condition: Condition<O>,
    /// Higher values are evaluated first
    pub priority: i32,
}

impl<Id: StateId, O> TransitionRule<Id, O> {
    pub fn new(from: Id, to: Id, condition: Condition<O>, priority: i32) -> Self {
        Self {
            from: Some(from),
            to,
            condition,
            priority,
        }
    }

    pub fn any(to: Id, condition: Condition<O>, priority: i32) -> Self {
        Self {
            from: None,
            to,
            condition,
            priority,
        }
    }

    pub fn is_any(&self) -> bool {
        self.from.is_none()
    }

    /// Whether this rule would move the machine out of `current`.
    ///
    /// A rule targeting the current state never fires; its condition is not
    /// evaluated in that case.
    pub fn can_fire(&self, current: &Id, owner: &O) -> bool {
        if self.to == *current {
            return false;
        }
        self.condition.check(owner)
    }
}

impl<Id: StateId, O> fmt::Debug for TransitionRule<Id, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionRule")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("priority", &self.priority)
            .finish()
    }
}
