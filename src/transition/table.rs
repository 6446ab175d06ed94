//! Prioritized transition rules grouped by source state.

use super::rule::TransitionRule;
use crate::core::StateId;
use std::collections::HashMap;

/// Rule buckets: one per source state plus a global any-state bucket.
///
/// Every bucket is kept sorted by descending priority as rules are added.
/// Rules of equal priority keep their insertion order, so resolution is
/// deterministic.
pub struct TransitionTable<Id: StateId, O> {
    any: Vec<TransitionRule<Id, O>>,
    by_source: HashMap<Id, Vec<TransitionRule<Id, O>>>,
}

impl<Id: StateId, O> Default for TransitionTable<Id, O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Id: StateId, O> TransitionTable<Id, O> {
    pub fn new() -> Self {
        Self {
            any: Vec::new(),
            by_source: HashMap::new(),
        }
    }

    /// Insert a rule into its bucket, after every rule of equal or higher
    /// priority.
    pub fn insert(&mut self, rule: TransitionRule<Id, O>) {
        let bucket = match &rule.from {
            None => &mut self.any,
            Some(from) => self.by_source.entry(from.clone()).or_default(),
        };
        let at = bucket
            .iter()
            .position(|existing| existing.priority < rule.priority)
            .unwrap_or(bucket.len());
        bucket.insert(at, rule);
    }

    /// Find the rule that should fire this tick.
    ///
    /// Any-state rules are evaluated strictly before the rules of `current`,
    /// regardless of priority. Within a bucket the first rule that can fire
    /// wins.
    pub fn evaluate(&self, current: &Id, owner: &O) -> Option<&TransitionRule<Id, O>> {
        self.any
            .iter()
            .find(|rule| rule.can_fire(current, owner))
            .or_else(|| {
                self.rules_from(current)
                    .iter()
                    .find(|rule| rule.can_fire(current, owner))
            })
    }

    pub fn any_rules(&self) -> &[TransitionRule<Id, O>] {
        &self.any
    }

    /// Rules whose source is `from`, in evaluation order.
    pub fn rules_from(&self, from: &Id) -> &[TransitionRule<Id, O>] {
        self.by_source.get(from).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every rule, any-state bucket first.
    pub fn rules(&self) -> impl Iterator<Item = &TransitionRule<Id, O>> {
        self.any.iter().chain(self.by_source.values().flatten())
    }

    pub fn len(&self) -> usize {
        self.any.len() + self.by_source.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
