//! Automatic transitions.
//!
//! Rules pair a [`Condition`](crate::core::Condition) over the owner with a
//! target state and a priority. Machines evaluate their table once per
//! `tick`, before the current state's own update runs, and take at most one
//! rule per tick.

mod rule;
mod table;

pub use rule::TransitionRule;
pub use table::TransitionTable;
