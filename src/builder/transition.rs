//! Builder for constructing transition rules.

use crate::builder::error::BuildError;
use crate::core::{Condition, StateId};
use crate::transition::TransitionRule;

/// Builder for constructing transition rules with a fluent API.
///
/// Omitting `.from()` produces an any-state rule. Omitting a condition
/// produces a rule that always fires.
pub struct TransitionBuilder<Id: StateId, O> {
    from: Option<Id>,
    to: Option<Id>,
    condition: Option<Condition<O>>,
    priority: i32,
}

impl<Id: StateId, O: 'static> TransitionBuilder<Id, O> {
    pub fn new() -> Self {
        Self {
            from: None,
            to: None,
            condition: None,
            priority: 0,
        }
    }

    /// Set the source state.
    pub fn from(mut self, id: Id) -> Self {
        self.from = Some(id);
        self
    }

    /// Set the target state (required).
    pub fn to(mut self, id: Id) -> Self {
        self.to = Some(id);
        self
    }

    /// Add a condition using a closure.
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&O) -> bool + 'static,
    {
        self.condition = Some(Condition::new(predicate));
        self
    }

    /// Add a prebuilt condition.
    pub fn condition(mut self, condition: Condition<O>) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Set the priority. Higher values are evaluated first.
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn build(self) -> Result<TransitionRule<Id, O>, BuildError> {
        let to = self.to.ok_or(BuildError::MissingToState)?;
        Ok(TransitionRule {
            from: self.from,
            to,
            condition: self.condition.unwrap_or_else(Condition::always),
            priority: self.priority,
        })
    }
}

impl<Id: StateId, O: 'static> Default for TransitionBuilder<Id, O> {
    fn default() -> Self {
        Self::new()
    }
}
