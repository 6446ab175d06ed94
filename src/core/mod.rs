//! Core state machine types.
//!
//! This module contains the building blocks shared by both machines:
//! - State identity via the `StateId` trait
//! - The lifecycle contract (`State`, `HierarchicalState`) and the
//!   `Transitions` request buffer handed to every hook
//! - Conditions over the owner that drive automatic transitions
//! - Committed change records and the bounded transition history

mod change;
mod condition;
mod history;
mod id;
mod lifecycle;

pub use change::{ChangeKind, StateChange};
pub use condition::Condition;
pub use history::{StateHistory, TransitionRecord};
pub use id::StateId;
pub use lifecycle::{HierarchicalState, Request, State, Transitions};
