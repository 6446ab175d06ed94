//! State machines driven by an external tick.
//!
//! # Key Concepts
//!
//! - **StateMachine**: one current state, manual changes plus prioritized
//!   rules evaluated on every `tick`
//! - **HierarchicalMachine**: a stack of states with push/pop, where pushed
//!   states pause (not exit) the ones beneath
//! - **SubStates**: a single active nested state owned by a parent state
//! - **Observers**: callbacks invoked with `(previous, current)` on every
//!   committed change
//!
//! # Reentrancy
//!
//! States request transitions through the [`Transitions`](crate::core::Transitions)
//! buffer passed to each hook. Requests made while a transition is in flight
//! are applied only after its exit/enter pair and notification complete.
//! Nesting is bounded by [`MachineConfig::max_transition_depth`](crate::config::MachineConfig);
//! requests beyond it are dropped with
//! [`MachineError::TransitionDepthExceeded`].

mod error;
mod flat;
mod hierarchy;
mod notifier;
mod observers;
mod registry;
mod substates;

pub use error::MachineError;
pub use flat::StateMachine;
pub use hierarchy::{HierarchicalMachine, PATH_SEPARATOR};
pub use observers::{ObserverId, Observers};
pub use substates::SubStates;
