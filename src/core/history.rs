//! Bounded log of committed transitions.
//!
//! History is diagnostic: it records what the machine did and when, so
//! hosts can inspect or export the path a machine took.

use super::change::{ChangeKind, StateChange};
use super::id::StateId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Record of a single committed transition.
///
/// # Example
///
/// ```rust
/// use tickwise::core::{ChangeKind, TransitionRecord};
/// use tickwise::state_enum;
/// use chrono::Utc;
///
/// state_enum! {
///     enum Door {
///         Closed,
///         Open,
///     }
/// }
///
/// let record = TransitionRecord {
///     from: Some(Door::Closed),
///     to: Door::Open,
///     kind: ChangeKind::Change,
///     timestamp: Utc::now(),
///     time_in_previous: 1.5,
/// };
/// assert_eq!(record.to, Door::Open);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TransitionRecord<Id: StateId> {
    /// The state being left, `None` for the first state
    pub from: Option<Id>,
    /// The state that became current
    pub to: Id,
    pub kind: ChangeKind,
    /// Wall-clock time the transition was committed
    pub timestamp: DateTime<Utc>,
    /// Accumulated tick time spent in `from`
    pub time_in_previous: f64,
}

impl<Id: StateId> TransitionRecord<Id> {
    pub(crate) fn from_change(change: &StateChange<Id>, time_in_previous: f64) -> Self {
        Self {
            from: change.previous.clone(),
            to: change.current.clone(),
            kind: change.kind,
            timestamp: Utc::now(),
            time_in_previous,
        }
    }
}

/// Ordered, capacity-bounded history of transitions.
///
/// When full, the oldest record is dropped. A capacity of zero disables
/// recording entirely.
///
/// # Example
///
/// ```rust
/// use tickwise::core::{ChangeKind, StateHistory, TransitionRecord};
/// use tickwise::state_enum;
/// use chrono::Utc;
///
/// state_enum! {
///     enum Phase {
///         One,
///         Two,
///         Three,
///     }
/// }
///
/// let mut history = StateHistory::with_capacity(8);
/// for (from, to) in [(Phase::One, Phase::Two), (Phase::Two, Phase::Three)] {
///     history.record(TransitionRecord {
///         from: Some(from),
///         to,
///         kind: ChangeKind::Change,
///         timestamp: Utc::now(),
///         time_in_previous: 0.0,
///     });
/// }
///
/// assert_eq!(history.path(), vec![&Phase::One, &Phase::Two, &Phase::Three]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<Id: StateId> {
    records: VecDeque<TransitionRecord<Id>>,
    capacity: usize,
}

impl<Id: StateId> StateHistory<Id> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    /// Append a record, evicting the oldest one when full.
    pub fn record(&mut self, record: TransitionRecord<Id>) {
        if self.capacity == 0 {
            return;
        }
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// States traversed, oldest first.
    ///
    /// Starts with the `from` of the oldest retained record (if it has one),
    /// then the `to` of every record.
    pub fn path(&self) -> Vec<&Id> {
        let mut path = Vec::new();
        if let Some(from) = self.records.front().and_then(|r| r.from.as_ref()) {
            path.push(from);
        }
        for record in &self.records {
            path.push(&record.to);
        }
        path
    }

    /// Wall-clock span between the oldest and newest retained records.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.records.front()?, self.records.back()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    pub fn records(&self) -> impl ExactSizeIterator<Item = &TransitionRecord<Id>> {
        self.records.iter()
    }

    pub fn last(&self) -> Option<&TransitionRecord<Id>> {
        self.records.back()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
