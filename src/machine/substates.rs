//! Nested sub-state slots and recursive lifecycle dispatch.
//!
//! A hierarchical state may own a [`SubStates`] table with at most one
//! active sub-state. The machine dispatches every hook to a state first and
//! then to its active sub-state, recursing one level per nesting. Exits run
//! the other way round: innermost sub-state first.

use super::error::MachineError;
use super::registry::{unknown, StateRegistry};
use crate::core::{HierarchicalState, StateId, Transitions};
use std::fmt;
use tracing::{trace, warn};

type BoxedState<Id, O> = Box<dyn HierarchicalState<Id, O>>;

/// Sub-state table owned by a parent state.
///
/// Activation is the parent's job: the machine enters the parent only, and
/// the parent calls [`change`](Self::change) (typically from `enter`) to
/// select a sub-state.
///
/// # Example
///
/// ```rust
/// use tickwise::core::{HierarchicalState, State, Transitions};
/// use tickwise::machine::SubStates;
/// use tickwise::state_enum;
///
/// state_enum! {
///     enum Mode {
///         Combat,
///         Aiming,
///         Reloading,
///     }
/// }
///
/// struct Aiming;
/// impl State<Mode, ()> for Aiming {}
/// impl HierarchicalState<Mode, ()> for Aiming {}
///
/// struct Reloading;
/// impl State<Mode, ()> for Reloading {}
/// impl HierarchicalState<Mode, ()> for Reloading {}
///
/// struct Combat {
///     stance: SubStates<Mode, ()>,
/// }
///
/// impl State<Mode, ()> for Combat {
///     fn initialize(&mut self, owner: &mut ()) {
///         self.stance.add(Mode::Aiming, Aiming, owner).unwrap();
///         self.stance.add(Mode::Reloading, Reloading, owner).unwrap();
///     }
///
///     fn enter(&mut self, owner: &mut (), transitions: &mut Transitions<Mode>) {
///         self.stance.change(Mode::Aiming, owner, transitions).unwrap();
///     }
/// }
///
/// impl HierarchicalState<Mode, ()> for Combat {
///     fn sub_states(&self) -> Option<&SubStates<Mode, ()>> {
///         Some(&self.stance)
///     }
///
///     fn sub_states_mut(&mut self) -> Option<&mut SubStates<Mode, ()>> {
///         Some(&mut self.stance)
///     }
/// }
/// ```
pub struct SubStates<Id: StateId, O> {
    states: StateRegistry<Id, BoxedState<Id, O>>,
    active: Option<Id>,
}

impl<Id: StateId, O> Default for SubStates<Id, O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Id: StateId, O> SubStates<Id, O> {
    pub fn new() -> Self {
        Self {
            states: StateRegistry::new(),
            active: None,
        }
    }

    /// Register a sub-state and bind it to the owner.
    pub fn add<S>(&mut self, id: Id, state: S, owner: &mut O) -> Result<(), MachineError>
    where
        S: HierarchicalState<Id, O> + 'static,
    {
        match self.states.insert(id, Box::new(state)) {
            Ok(state) => {
                state.initialize(owner);
                Ok(())
            }
            Err(error) => {
                warn!("sub-state registration rejected: {error}");
                Err(error)
            }
        }
    }

    /// Switch the active sub-state.
    ///
    /// The previous sub-state (and its own nested chain) is exited before the
    /// new one is entered. Switching to the active sub-state does nothing.
    pub fn change(
        &mut self,
        id: Id,
        owner: &mut O,
        transitions: &mut Transitions<Id>,
    ) -> Result<(), MachineError> {
        if self.active.as_ref() == Some(&id) {
            return Ok(());
        }
        if !self.states.contains(&id) {
            let error = unknown(&id);
            warn!("sub-state change rejected: {error}");
            return Err(error);
        }

        self.clear(owner, transitions);
        trace!("sub-state entered: {}", id.name());
        if let Some(state) = self.states.get_mut(&id) {
            enter_hierarchy(&mut **state, owner, transitions);
        }
        self.active = Some(id);
        Ok(())
    }

    /// Exit the active sub-state chain, leaving the slot empty.
    pub fn clear(&mut self, owner: &mut O, transitions: &mut Transitions<Id>) {
        let Some(id) = self.active.take() else {
            return;
        };
        if let Some(state) = self.states.get_mut(&id) {
            exit_hierarchy(&mut **state, owner, transitions);
        }
        trace!("sub-state exited: {}", id.name());
    }

    pub fn active_id(&self) -> Option<&Id> {
        self.active.as_ref()
    }

    pub fn active(&self) -> Option<&(dyn HierarchicalState<Id, O> + 'static)> {
        let id = self.active.as_ref()?;
        self.states.get(id).map(|state| state.as_ref())
    }

    pub fn active_mut(&mut self) -> Option<&mut (dyn HierarchicalState<Id, O> + 'static)> {
        let id = self.active.as_ref()?;
        self.states.get_mut(id).map(|state| state.as_mut())
    }

    /// Ids of the active sub-state and its own active descendants,
    /// outermost first.
    pub fn active_chain(&self) -> Vec<Id> {
        let mut chain = Vec::new();
        let mut slot = Some(self);
        while let Some(subs) = slot {
            let (Some(id), Some(state)) = (subs.active_id(), subs.active()) else {
                break;
            };
            chain.push(id.clone());
            slot = state.sub_states();
        }
        chain
    }

    pub fn contains(&self, id: &Id) -> bool {
        self.states.contains(id)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.len() == 0
    }
}

impl<Id: StateId, O> fmt::Debug for SubStates<Id, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubStates")
            .field("len", &self.states.len())
            .field("active", &self.active)
            .finish()
    }
}

/// Enter a state. Its sub-states are left for the state to activate.
pub(crate) fn enter_hierarchy<Id, O, S>(state: &mut S, owner: &mut O, transitions: &mut Transitions<Id>)
where
    Id: StateId,
    S: HierarchicalState<Id, O> + ?Sized,
{
    state.enter(owner, transitions);
}

/// Exit the active sub-state chain innermost first, then the state itself.
pub(crate) fn exit_hierarchy<Id, O, S>(state: &mut S, owner: &mut O, transitions: &mut Transitions<Id>)
where
    Id: StateId,
    S: HierarchicalState<Id, O> + ?Sized,
{
    if let Some(subs) = state.sub_states_mut() {
        subs.clear(owner, transitions);
    }
    state.exit(owner, transitions);
}

pub(crate) fn tick_hierarchy<Id, O, S>(
    state: &mut S,
    owner: &mut O,
    dt: f64,
    transitions: &mut Transitions<Id>,
) where
    Id: StateId,
    S: HierarchicalState<Id, O> + ?Sized,
{
    state.tick(owner, dt, transitions);
    if let Some(active) = state.sub_states_mut().and_then(SubStates::active_mut) {
        tick_hierarchy(active, owner, dt, transitions);
    }
}

pub(crate) fn fixed_tick_hierarchy<Id, O, S>(
    state: &mut S,
    owner: &mut O,
    dt: f64,
    transitions: &mut Transitions<Id>,
) where
    Id: StateId,
    S: HierarchicalState<Id, O> + ?Sized,
{
    state.fixed_tick(owner, dt, transitions);
    if let Some(active) = state.sub_states_mut().and_then(SubStates::active_mut) {
        fixed_tick_hierarchy(active, owner, dt, transitions);
    }
}
