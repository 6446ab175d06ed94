//! Tickwise: tick-driven state machines for game and simulation loops
//!
//! Every machine is bound to one owner value and advanced by an external
//! loop calling `tick(dt)` and `fixed_tick(dt)`. Nothing here reads a clock
//! or spawns a thread.
//!
//! # Core Concepts
//!
//! - **StateId**: cheap, hashable identifiers that name states
//! - **State**: lifecycle hooks (`initialize`, `enter`, `tick`, `fixed_tick`,
//!   `exit`) receiving the owner and a request buffer
//! - **Transition rules**: prioritized conditions over the owner evaluated
//!   once per tick
//! - **StateMachine**: a single current state
//! - **HierarchicalMachine**: a push/pop stack of states with pause and
//!   resume, plus nested sub-states inside any state
//!
//! # Example
//!
//! ```rust
//! use tickwise::builder::StateMachineBuilder;
//! use tickwise::core::{State, Transitions};
//! use tickwise::state_enum;
//!
//! state_enum! {
//!     enum Door {
//!         Closed,
//!         Open,
//!     }
//! }
//!
//! struct Sensor {
//!     someone_near: bool,
//!     opened: u32,
//! }
//!
//! struct Closed;
//! impl State<Door, Sensor> for Closed {}
//!
//! struct Open;
//! impl State<Door, Sensor> for Open {
//!     fn enter(&mut self, sensor: &mut Sensor, _transitions: &mut Transitions<Door>) {
//!         sensor.opened += 1;
//!     }
//! }
//!
//! let mut machine = StateMachineBuilder::new()
//!     .state(Door::Closed, Closed)
//!     .state(Door::Open, Open)
//!     .rule(Door::Closed, Door::Open, |s: &Sensor| s.someone_near, 0)
//!     .rule(Door::Open, Door::Closed, |s: &Sensor| !s.someone_near, 0)
//!     .initial(Door::Closed)
//!     .build(Sensor { someone_near: false, opened: 0 })
//!     .unwrap();
//!
//! machine.owner_mut().someone_near = true;
//! machine.tick(0.02);
//! assert!(machine.is_in_state(&Door::Open));
//! assert_eq!(machine.owner().opened, 1);
//! ```

pub mod builder;
pub mod config;
pub mod core;
pub mod machine;
pub mod transition;

// Re-export commonly used types
pub use builder::{BuildError, StateMachineBuilder, TransitionBuilder};
pub use config::MachineConfig;
pub use core::{
    ChangeKind, Condition, HierarchicalState, State, StateChange, StateHistory, StateId,
    Transitions,
};
pub use machine::{HierarchicalMachine, MachineError, StateMachine, SubStates};
pub use transition::{TransitionRule, TransitionTable};
