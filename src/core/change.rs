//! Committed state changes, as delivered to observers and history.

use super::id::StateId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a state change was committed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeKind {
    /// Machine entered its first state.
    Start,
    /// Regular change, manual or rule-driven.
    Change,
    /// Current state replaced without the redundant-change check.
    Force,
    /// New state pushed over a paused one.
    Push,
    /// Top state popped, the one beneath resumed.
    Pop,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Start => "start",
            Self::Change => "change",
            Self::Force => "force",
            Self::Push => "push",
            Self::Pop => "pop",
        };
        f.write_str(s)
    }
}

/// A committed transition: `(previous, current)` plus how it happened.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateChange<Id: StateId> {
    pub previous: Option<Id>,
    pub current: Id,
    pub kind: ChangeKind,
}

impl<Id: StateId> fmt::Display for StateChange<Id> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.previous {
            Some(prev) => write!(f, "{} -> {} ({})", prev.name(), self.current.name(), self.kind),
            None => write!(f, "-> {} ({})", self.current.name(), self.kind),
        }
    }
}
