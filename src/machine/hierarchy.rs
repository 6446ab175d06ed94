//! Stack-based hierarchical state machine.

use super::error::MachineError;
use super::notifier::Notifier;
use super::observers::Observers;
use super::registry::{unknown, StateRegistry};
use super::substates::{enter_hierarchy, exit_hierarchy, fixed_tick_hierarchy, tick_hierarchy};
use crate::builder::{validate_definition, DefinitionError};
use crate::config::MachineConfig;
use crate::core::{
    ChangeKind, Condition, HierarchicalState, Request, StateChange, StateHistory, StateId,
    Transitions,
};
use crate::transition::{TransitionRule, TransitionTable};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use tracing::trace;
use uuid::Uuid;

type BoxedState<Id, O> = Box<dyn HierarchicalState<Id, O>>;

/// Separator used by [`HierarchicalMachine::current_state_path`].
pub const PATH_SEPARATOR: &str = " > ";

/// State machine with a stack of active states, innermost last.
///
/// Only the top frame is driven. Pushing pauses the current top instead of
/// exiting it, and popping resumes it, so a covered state keeps whatever
/// progress it had made.
///
/// # Example
///
/// ```rust
/// use tickwise::core::{HierarchicalState, State};
/// use tickwise::machine::HierarchicalMachine;
/// use tickwise::state_enum;
///
/// state_enum! {
///     enum Screen {
///         Gameplay,
///         Pause,
///         Settings,
///     }
/// }
///
/// struct Plain;
/// impl State<Screen, ()> for Plain {}
/// impl HierarchicalState<Screen, ()> for Plain {}
///
/// let mut machine = HierarchicalMachine::new(());
/// for id in [Screen::Gameplay, Screen::Pause, Screen::Settings] {
///     machine.add_state(id, Plain).unwrap();
/// }
///
/// machine.start(Screen::Gameplay).unwrap();
/// machine.push_state(Screen::Pause).unwrap();
/// machine.push_state(Screen::Settings).unwrap();
/// assert_eq!(machine.current_state_path(), "Gameplay > Pause > Settings");
/// assert!(machine.is_in_state(&Screen::Pause));
///
/// machine.pop_state().unwrap();
/// assert_eq!(machine.current_state_id(), Some(&Screen::Pause));
/// ```
pub struct HierarchicalMachine<Id: StateId, O> {
    owner: O,
    states: StateRegistry<Id, BoxedState<Id, O>>,
    table: TransitionTable<Id, O>,
    stack: Vec<Id>,
    previous: Option<Id>,
    state_time: f64,
    config: MachineConfig,
    notifier: Notifier<Id>,
}

impl<Id: StateId, O> HierarchicalMachine<Id, O> {
    pub fn new(owner: O) -> Self {
        Self::with_config(owner, MachineConfig::default())
    }

    pub fn with_config(owner: O, config: MachineConfig) -> Self {
        Self {
            owner,
            states: StateRegistry::new(),
            table: TransitionTable::new(),
            stack: Vec::new(),
            previous: None,
            state_time: 0.0,
            notifier: Notifier::new(&config),
            config,
        }
    }

    /// Register a state and bind it to the owner. The first registration of
    /// an id wins.
    pub fn add_state<S>(&mut self, id: Id, state: S) -> Result<(), MachineError>
    where
        S: HierarchicalState<Id, O> + 'static,
    {
        self.add_boxed_state(id, Box::new(state))
    }

    pub fn add_boxed_state(&mut self, id: Id, state: BoxedState<Id, O>) -> Result<(), MachineError> {
        match self.states.insert(id, state) {
            Ok(state) => {
                state.initialize(&mut self.owner);
                Ok(())
            }
            Err(error) => Err(self.notifier.report(error)),
        }
    }

    /// Add a rule evaluated while `from` is the top frame. A firing rule
    /// performs a full [`change_state`](Self::change_state).
    pub fn add_transition<F>(&mut self, from: Id, to: Id, condition: F, priority: i32)
    where
        F: Fn(&O) -> bool + 'static,
    {
        self.add_rule(TransitionRule::new(
            from,
            to,
            Condition::new(condition),
            priority,
        ));
    }

    /// Add a rule evaluated every tick, before any from-specific rule.
    ///
    /// Evaluation stops at the first rule whose condition holds. An any-rule
    /// targeting an unregistered id therefore blocks every rule after it;
    /// [`validate`](Self::validate) reports such rules and `start` logs them.
    pub fn add_any_transition<F>(&mut self, to: Id, condition: F, priority: i32)
    where
        F: Fn(&O) -> bool + 'static,
    {
        self.add_rule(TransitionRule::any(to, Condition::new(condition), priority));
    }

    pub fn add_rule(&mut self, rule: TransitionRule<Id, O>) {
        self.table.insert(rule);
    }

    /// Reset the stack to the single frame `id`.
    ///
    /// Any frames already on the stack are exited top-down first.
    pub fn start(&mut self, id: Id) -> Result<(), MachineError> {
        let kind = if self.stack.is_empty() {
            self.notifier.report_definition(self.validate());
            ChangeKind::Start
        } else {
            ChangeKind::Force
        };
        self.replace_stack(id, kind, 0)
    }

    /// Alias of [`start`](Self::start): the stack becomes exactly `[id]`.
    pub fn force_state(&mut self, id: Id) -> Result<(), MachineError> {
        self.start(id)
    }

    /// Replace the whole stack with `id`.
    ///
    /// Does nothing if `id` is already the only frame.
    pub fn change_state(&mut self, id: Id) -> Result<(), MachineError> {
        self.change_state_at(id, 0)
    }

    /// Pause the top frame and enter `id` above it.
    pub fn push_state(&mut self, id: Id) -> Result<(), MachineError> {
        self.push_state_at(id, 0)
    }

    /// Exit the top frame and resume the one beneath. A single remaining
    /// frame is never popped.
    pub fn pop_state(&mut self) -> Result<(), MachineError> {
        self.pop_state_at(0)
    }

    /// Evaluate rules against the top frame, then update it and its active
    /// sub-states.
    pub fn tick(&mut self, dt: f64) {
        let Some(top) = self.stack.last().cloned() else {
            trace!(machine = %self.notifier.machine_id(), "tick ignored: machine not started");
            return;
        };

        let fired = self
            .table
            .evaluate(&top, &self.owner)
            .map(|rule| rule.to.clone());
        if let Some(target) = fired {
            trace!(
                machine = %self.notifier.machine_id(),
                "rule fired: {} -> {}",
                top.name(),
                target.name()
            );
            let _ = self.change_state(target);
        }

        let Some(top) = self.stack.last().cloned() else {
            return;
        };
        self.state_time += dt;

        let mut transitions = Transitions::new();
        if let Some(state) = self.states.get_mut(&top) {
            tick_hierarchy(&mut **state, &mut self.owner, dt, &mut transitions);
        }
        self.apply(transitions, 0);
    }

    pub fn fixed_tick(&mut self, dt: f64) {
        let Some(top) = self.stack.last().cloned() else {
            return;
        };

        let mut transitions = Transitions::new();
        if let Some(state) = self.states.get_mut(&top) {
            fixed_tick_hierarchy(&mut **state, &mut self.owner, dt, &mut transitions);
        }
        self.apply(transitions, 0);
    }

    /// The top frame.
    pub fn current_state_id(&self) -> Option<&Id> {
        self.stack.last()
    }

    /// The top frame before the last committed change.
    pub fn previous_state_id(&self) -> Option<&Id> {
        self.previous.as_ref()
    }

    /// Tick time since the top frame last changed.
    pub fn state_time(&self) -> f64 {
        self.state_time
    }

    /// Whether `id` is anywhere in the stack, including active sub-states
    /// of any frame.
    pub fn is_in_state(&self, id: &Id) -> bool {
        self.active_ids().iter().any(|active| active == id)
    }

    /// Every active id from the root frame to the innermost sub-state.
    pub fn active_ids(&self) -> Vec<Id> {
        let mut ids = Vec::with_capacity(self.stack.len());
        for frame in &self.stack {
            ids.push(frame.clone());
            if let Some(subs) = self.states.get(frame).and_then(|state| state.sub_states()) {
                ids.extend(subs.active_chain());
            }
        }
        ids
    }

    /// Names of [`active_ids`](Self::active_ids) joined by `" > "`.
    pub fn current_state_path(&self) -> String {
        self.active_ids()
            .iter()
            .map(|id| id.name())
            .collect::<Vec<_>>()
            .join(PATH_SEPARATOR)
    }

    pub fn stack(&self) -> &[Id] {
        &self.stack
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn is_started(&self) -> bool {
        !self.stack.is_empty()
    }

    pub fn has_state(&self, id: &Id) -> bool {
        self.states.contains(id)
    }

    pub fn owner(&self) -> &O {
        &self.owner
    }

    pub fn owner_mut(&mut self) -> &mut O {
        &mut self.owner
    }

    pub fn transitions(&self) -> &TransitionTable<Id, O> {
        &self.table
    }

    pub fn history(&self) -> &StateHistory<Id> {
        &self.notifier.history
    }

    pub fn observers_mut(&mut self) -> &mut Observers<Id> {
        &mut self.notifier.observers
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn id(&self) -> Uuid {
        self.notifier.machine_id()
    }

    pub fn validate(&self) -> Validation<(), NonEmptyVec<DefinitionError>> {
        validate_definition(|id| self.states.contains(id), &self.table, None)
    }

    fn change_state_at(&mut self, id: Id, depth: usize) -> Result<(), MachineError> {
        if self.stack.len() == 1 && self.stack[0] == id {
            return Ok(());
        }
        let kind = if self.stack.is_empty() {
            ChangeKind::Start
        } else {
            ChangeKind::Change
        };
        self.replace_stack(id, kind, depth)
    }

    fn replace_stack(&mut self, id: Id, kind: ChangeKind, depth: usize) -> Result<(), MachineError> {
        self.check_target(&id, depth)?;

        let mut transitions = Transitions::new();
        let previous = self.stack.last().cloned();
        while let Some(frame) = self.stack.pop() {
            if let Some(state) = self.states.get_mut(&frame) {
                exit_hierarchy(&mut **state, &mut self.owner, &mut transitions);
            }
        }

        self.stack.push(id.clone());
        if let Some(state) = self.states.get_mut(&id) {
            enter_hierarchy(&mut **state, &mut self.owner, &mut transitions);
        }
        self.commit(previous, id, kind, depth, transitions);
        Ok(())
    }

    fn push_state_at(&mut self, id: Id, depth: usize) -> Result<(), MachineError> {
        self.check_target(&id, depth)?;
        if self.stack.contains(&id) {
            return Err(self.notifier.report(MachineError::AlreadyOnStack {
                id: id.name().to_string(),
            }));
        }

        let mut transitions = Transitions::new();
        let previous = self.stack.last().cloned();
        if let Some(top) = &previous {
            if let Some(state) = self.states.get_mut(top) {
                state.pause(&mut self.owner, &mut transitions);
            }
        }

        self.stack.push(id.clone());
        if let Some(state) = self.states.get_mut(&id) {
            enter_hierarchy(&mut **state, &mut self.owner, &mut transitions);
        }
        let kind = if previous.is_some() {
            ChangeKind::Push
        } else {
            ChangeKind::Start
        };
        self.commit(previous, id, kind, depth, transitions);
        Ok(())
    }

    fn pop_state_at(&mut self, depth: usize) -> Result<(), MachineError> {
        if self.stack.len() <= 1 {
            return Ok(());
        }
        if depth > self.config.max_transition_depth {
            // A pop moves the machine to the frame beneath the top.
            let exposed = &self.stack[self.stack.len() - 2];
            return Err(self.depth_exceeded(exposed.name(), depth));
        }

        let mut transitions = Transitions::new();
        let popped = self.stack.pop();
        if let Some(frame) = &popped {
            if let Some(state) = self.states.get_mut(frame) {
                exit_hierarchy(&mut **state, &mut self.owner, &mut transitions);
            }
        }

        let Some(exposed) = self.stack.last().cloned() else {
            return Ok(());
        };
        if let Some(state) = self.states.get_mut(&exposed) {
            state.resume(&mut self.owner, &mut transitions);
        }
        self.commit(popped, exposed, ChangeKind::Pop, depth, transitions);
        Ok(())
    }

    fn check_target(&self, id: &Id, depth: usize) -> Result<(), MachineError> {
        if depth > self.config.max_transition_depth {
            return Err(self.depth_exceeded(id.name(), depth));
        }
        if !self.states.contains(id) {
            return Err(self.notifier.report(unknown(id)));
        }
        Ok(())
    }

    fn depth_exceeded(&self, target: &str, depth: usize) -> MachineError {
        self.notifier.report(MachineError::TransitionDepthExceeded {
            target: target.to_string(),
            depth,
            limit: self.config.max_transition_depth,
        })
    }

    fn commit(
        &mut self,
        previous: Option<Id>,
        current: Id,
        kind: ChangeKind,
        depth: usize,
        transitions: Transitions<Id>,
    ) {
        let time_in_previous = std::mem::replace(&mut self.state_time, 0.0);
        self.previous = previous.clone();
        self.notifier.commit(
            StateChange {
                previous,
                current,
                kind,
            },
            time_in_previous,
        );
        self.apply(transitions, depth + 1);
    }

    fn apply(&mut self, mut transitions: Transitions<Id>, depth: usize) {
        for request in transitions.take() {
            let _ = match request {
                Request::Change(id) => self.change_state_at(id, depth),
                Request::Push(id) => self.push_state_at(id, depth),
                Request::Pop => self.pop_state_at(depth),
            };
        }
    }
}
