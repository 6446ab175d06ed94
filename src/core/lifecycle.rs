//! The lifecycle contract every state implements.
//!
//! States never hold a reference to their machine. Each hook receives the
//! owner and a [`Transitions`] buffer; a state that wants to move the
//! machine records a request there and the machine applies it once the
//! hook has returned.

use super::id::StateId;
use crate::machine::SubStates;

/// A transition requested from inside a lifecycle hook.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request<Id> {
    /// Replace the current state (or the whole stack).
    Change(Id),
    /// Suspend the current state and enter a new one on top of it.
    Push(Id),
    /// Exit the top state and resume the one beneath it.
    Pop,
}

/// Buffer of transition requests recorded by a state during one hook.
///
/// Requests are applied in the order they were recorded.
#[derive(Debug)]
pub struct Transitions<Id> {
    requests: Vec<Request<Id>>,
}

impl<Id> Default for Transitions<Id> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Id> Transitions<Id> {
    pub fn new() -> Self {
        Self {
            requests: Vec::new(),
        }
    }

    /// Request a change to `id`.
    pub fn change_state(&mut self, id: Id) {
        self.requests.push(Request::Change(id));
    }

    /// Request `id` be pushed on top of the current state.
    ///
    /// Only hierarchical machines honour push requests.
    pub fn push_state(&mut self, id: Id) {
        self.requests.push(Request::Push(id));
    }

    /// Request the top state be popped.
    ///
    /// Only hierarchical machines honour pop requests.
    pub fn pop_state(&mut self) {
        self.requests.push(Request::Pop);
    }

    pub fn requests(&self) -> &[Request<Id>] {
        &self.requests
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub(crate) fn take(&mut self) -> Vec<Request<Id>> {
        std::mem::take(&mut self.requests)
    }
}

/// Behavior bound to one owner, driven by a state machine.
///
/// All hooks default to no-ops. The machine guarantees:
///
/// 1. `initialize()` - once, at registration, before any other hook
/// 2. `enter()` - once each time the state becomes current
/// 3. `tick()` / `fixed_tick()` - while current, at the host's cadence
/// 4. `exit()` - once when the state stops being current, before the next
///    state's `enter()`
///
/// # Example
///
/// ```rust
/// use tickwise::core::{State, StateId, Transitions};
/// # use serde::{Deserialize, Serialize};
/// # #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
/// # enum Mode { Idle, Alert }
/// # impl StateId for Mode {
/// #     fn name(&self) -> &str { "Mode" }
/// # }
///
/// struct Sentry {
///     noise: f32,
/// }
///
/// struct Idle {
///     waited: f64,
/// }
///
/// impl State<Mode, Sentry> for Idle {
///     fn enter(&mut self, _owner: &mut Sentry, _transitions: &mut Transitions<Mode>) {
///         self.waited = 0.0;
///     }
///
///     fn tick(&mut self, owner: &mut Sentry, dt: f64, transitions: &mut Transitions<Mode>) {
///         self.waited += dt;
///         if owner.noise > 0.5 {
///             transitions.change_state(Mode::Alert);
///         }
///     }
/// }
/// ```
pub trait State<Id: StateId, O> {
    /// Bind the state to its owner.
    fn initialize(&mut self, _owner: &mut O) {}

    fn enter(&mut self, _owner: &mut O, _transitions: &mut Transitions<Id>) {}

    fn tick(&mut self, _owner: &mut O, _dt: f64, _transitions: &mut Transitions<Id>) {}

    /// Fixed-step update, independent of `tick`'s cadence.
    fn fixed_tick(&mut self, _owner: &mut O, _dt: f64, _transitions: &mut Transitions<Id>) {}

    fn exit(&mut self, _owner: &mut O, _transitions: &mut Transitions<Id>) {}
}

/// A state usable on a [`HierarchicalMachine`](crate::machine::HierarchicalMachine) stack.
///
/// `pause`/`resume` are distinct from `exit`/`enter`: a state covered by a
/// push keeps its internal progress (and its active sub-state) and picks up
/// where it left off once the covering state is popped.
pub trait HierarchicalState<Id: StateId, O>: State<Id, O> {
    /// Called on the top state when another state is pushed over it.
    fn pause(&mut self, _owner: &mut O, _transitions: &mut Transitions<Id>) {}

    /// Called on the newly exposed top state after a pop.
    fn resume(&mut self, _owner: &mut O, _transitions: &mut Transitions<Id>) {}

    /// The nested sub-state slot this state owns, if any.
    fn sub_states(&self) -> Option<&SubStates<Id, O>> {
        None
    }

    fn sub_states_mut(&mut self) -> Option<&mut SubStates<Id, O>> {
        None
    }
}
