//! Flat state machine: one current state, manual or rule-driven changes.

use super::error::MachineError;
use super::notifier::Notifier;
use super::observers::Observers;
use super::registry::{unknown, StateRegistry};
use crate::builder::{validate_definition, DefinitionError};
use crate::config::MachineConfig;
use crate::core::{
    ChangeKind, Condition, Request, State, StateChange, StateHistory, StateId, Transitions,
};
use crate::transition::{TransitionRule, TransitionTable};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use tracing::trace;
use uuid::Uuid;

type BoxedState<Id, O> = Box<dyn State<Id, O>>;

/// State machine holding a single current state bound to one owner.
///
/// # Example
///
/// ```rust
/// use tickwise::core::{State, Transitions};
/// use tickwise::machine::StateMachine;
/// use tickwise::state_enum;
///
/// state_enum! {
///     enum Gait {
///         Idle,
///         Walk,
///     }
/// }
///
/// struct Body {
///     speed: f32,
/// }
///
/// struct Still;
/// impl State<Gait, Body> for Still {}
///
/// struct Moving;
/// impl State<Gait, Body> for Moving {}
///
/// let mut machine = StateMachine::new(Body { speed: 0.0 });
/// machine.add_state(Gait::Idle, Still).unwrap();
/// machine.add_state(Gait::Walk, Moving).unwrap();
/// machine.add_transition(Gait::Idle, Gait::Walk, |b: &Body| b.speed > 0.0, 1);
/// machine.start(Gait::Idle).unwrap();
///
/// machine.owner_mut().speed = 1.5;
/// machine.tick(0.016);
///
/// assert_eq!(machine.current_state_id(), Some(&Gait::Walk));
/// assert_eq!(machine.previous_state_id(), Some(&Gait::Idle));
/// ```
pub struct StateMachine<Id: StateId, O> {
    owner: O,
    states: StateRegistry<Id, BoxedState<Id, O>>,
    table: TransitionTable<Id, O>,
    current: Option<Id>,
    previous: Option<Id>,
    state_time: f64,
    config: MachineConfig,
    notifier: Notifier<Id>,
}

impl<Id: StateId, O> StateMachine<Id, O> {
    pub fn new(owner: O) -> Self {
        Self::with_config(owner, MachineConfig::default())
    }

    pub fn with_config(owner: O, config: MachineConfig) -> Self {
        Self {
            owner,
            states: StateRegistry::new(),
            table: TransitionTable::new(),
            current: None,
            previous: None,
            state_time: 0.0,
            notifier: Notifier::new(&config),
            config,
        }
    }

    /// Register a state and bind it to the owner.
    ///
    /// Registering an id twice keeps the first state; the second is dropped
    /// without being initialized.
    pub fn add_state<S>(&mut self, id: Id, state: S) -> Result<(), MachineError>
    where
        S: State<Id, O> + 'static,
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

    /// Add a rule evaluated while `from` is current.
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

    /// Enter the first state, bypassing rule evaluation.
    ///
    /// On a machine that is already running this behaves like
    /// [`force_state`](Self::force_state).
    pub fn start(&mut self, id: Id) -> Result<(), MachineError> {
        if self.current.is_none() {
            self.notifier.report_definition(self.validate());
        }
        self.force_state(id)
    }

    /// Make `id` current unconditionally.
    ///
    /// Unlike [`change_state`](Self::change_state), forcing the current state
    /// exits and re-enters it.
    pub fn force_state(&mut self, id: Id) -> Result<(), MachineError> {
        let kind = if self.current.is_some() {
            ChangeKind::Force
        } else {
            ChangeKind::Start
        };
        self.commit(id, kind, 0)
    }

    /// Change to `id`. Changing to the current state does nothing.
    pub fn change_state(&mut self, id: Id) -> Result<(), MachineError> {
        self.change_state_at(id, 0)
    }

    /// Evaluate rules, then update the current state.
    ///
    /// At most one rule fires per tick. The state that is current after rule
    /// evaluation is the one whose `tick` runs.
    pub fn tick(&mut self, dt: f64) {
        let Some(current) = self.current.clone() else {
            trace!(machine = %self.notifier.machine_id(), "tick ignored: machine not started");
            return;
        };

        let fired = self
            .table
            .evaluate(&current, &self.owner)
            .map(|rule| rule.to.clone());
        if let Some(target) = fired {
            trace!(
                machine = %self.notifier.machine_id(),
                "rule fired: {} -> {}",
                current.name(),
                target.name()
            );
            let _ = self.change_state(target);
        }

        let Some(current) = self.current.clone() else {
            return;
        };
        self.state_time += dt;

        let mut transitions = Transitions::new();
        if let Some(state) = self.states.get_mut(&current) {
            state.tick(&mut self.owner, dt, &mut transitions);
        }
        self.apply(transitions, 0);
    }

    /// Forward a fixed-step update to the current state. Rules are not
    /// evaluated on the fixed cadence.
    pub fn fixed_tick(&mut self, dt: f64) {
        let Some(current) = self.current.clone() else {
            return;
        };

        let mut transitions = Transitions::new();
        if let Some(state) = self.states.get_mut(&current) {
            state.fixed_tick(&mut self.owner, dt, &mut transitions);
        }
        self.apply(transitions, 0);
    }

    pub fn current_state_id(&self) -> Option<&Id> {
        self.current.as_ref()
    }

    pub fn previous_state_id(&self) -> Option<&Id> {
        self.previous.as_ref()
    }

    /// Tick time accumulated since the last committed transition.
    pub fn state_time(&self) -> f64 {
        self.state_time
    }

    pub fn is_in_state(&self, id: &Id) -> bool {
        self.current.as_ref() == Some(id)
    }

    /// Name of the current state, or an empty string before `start`.
    pub fn current_state_path(&self) -> String {
        self.current
            .as_ref()
            .map(|id| id.name().to_string())
            .unwrap_or_default()
    }

    pub fn is_started(&self) -> bool {
        self.current.is_some()
    }

    pub fn has_state(&self, id: &Id) -> bool {
        self.states.contains(id)
    }

    pub fn state_ids(&self) -> impl Iterator<Item = &Id> {
        self.states.ids()
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

    /// Identifier attached to this machine's log events.
    pub fn id(&self) -> Uuid {
        self.notifier.machine_id()
    }

    /// Check every rule against the registered states, collecting all
    /// problems.
    pub fn validate(&self) -> Validation<(), NonEmptyVec<DefinitionError>> {
        validate_definition(|id| self.states.contains(id), &self.table, None)
    }

    fn change_state_at(&mut self, id: Id, depth: usize) -> Result<(), MachineError> {
        if self.current.as_ref() == Some(&id) {
            return Ok(());
        }
        let kind = if self.current.is_some() {
            ChangeKind::Change
        } else {
            ChangeKind::Start
        };
        self.commit(id, kind, depth)
    }

    /// Exit, swap, enter, notify, then apply whatever the two hooks asked
    /// for one level deeper.
    fn commit(&mut self, id: Id, kind: ChangeKind, depth: usize) -> Result<(), MachineError> {
        if depth > self.config.max_transition_depth {
            return Err(self.notifier.report(MachineError::TransitionDepthExceeded {
                target: id.name().to_string(),
                depth,
                limit: self.config.max_transition_depth,
            }));
        }
        if !self.states.contains(&id) {
            return Err(self.notifier.report(unknown(&id)));
        }

        let mut transitions = Transitions::new();
        if let Some(old) = self.current.take() {
            if let Some(state) = self.states.get_mut(&old) {
                state.exit(&mut self.owner, &mut transitions);
            }
            self.previous = Some(old);
        }

        let time_in_previous = std::mem::replace(&mut self.state_time, 0.0);
        self.current = Some(id.clone());
        if let Some(state) = self.states.get_mut(&id) {
            state.enter(&mut self.owner, &mut transitions);
        }

        let change = StateChange {
            previous: self.previous.clone(),
            current: id,
            kind,
        };
        self.notifier.commit(change, time_in_previous);
        self.apply(transitions, depth + 1);
        Ok(())
    }

    fn apply(&mut self, mut transitions: Transitions<Id>, depth: usize) {
        for request in transitions.take() {
            let _ = match request {
                Request::Change(id) => self.change_state_at(id, depth),
                Request::Push(_) => Err(self
                    .notifier
                    .report(MachineError::UnsupportedRequest { request: "push" })),
                Request::Pop => Err(self
                    .notifier
                    .report(MachineError::UnsupportedRequest { request: "pop" })),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
    enum Gait {
        Idle,
        Walk,
        Run,
        Fall,
    }

    impl StateId for Gait {
        fn name(&self) -> &str {
            match self {
                Self::Idle => "Idle",
                Self::Walk => "Walk",
                Self::Run => "Run",
                Self::Fall => "Fall",
            }
        }
    }

    #[derive(Default)]
    struct Body {
        speed: f32,
        grounded: bool,
        log: Vec<String>,
    }

    /// Logs every hook into the owner.
    struct Recording(Gait);

    impl State<Gait, Body> for Recording {
        fn initialize(&mut self, owner: &mut Body) {
            owner.log.push(format!("init {}", self.0.name()));
        }

        fn enter(&mut self, owner: &mut Body, _t: &mut Transitions<Gait>) {
            owner.log.push(format!("enter {}", self.0.name()));
        }

        fn tick(&mut self, owner: &mut Body, _dt: f64, _t: &mut Transitions<Gait>) {
            owner.log.push(format!("tick {}", self.0.name()));
        }

        fn fixed_tick(&mut self, owner: &mut Body, _dt: f64, _t: &mut Transitions<Gait>) {
            owner.log.push(format!("fixed {}", self.0.name()));
        }

        fn exit(&mut self, owner: &mut Body, _t: &mut Transitions<Gait>) {
            owner.log.push(format!("exit {}", self.0.name()));
        }
    }

    fn machine() -> StateMachine<Gait, Body> {
        let mut machine = StateMachine::new(Body {
            grounded: true,
            ..Body::default()
        });
        for id in [Gait::Idle, Gait::Walk, Gait::Run, Gait::Fall] {
            machine.add_state(id, Recording(id)).unwrap();
        }
        machine.owner_mut().log.clear();
        machine
    }

    fn count(machine: &StateMachine<Gait, Body>, entry: &str) -> usize {
        machine.owner().log.iter().filter(|l| *l == entry).count()
    }

    #[test]
    fn initialize_runs_once_at_registration() {
        let mut machine = StateMachine::new(Body::default());
        machine.add_state(Gait::Idle, Recording(Gait::Idle)).unwrap();

        assert_eq!(machine.owner().log, vec!["init Idle"]);
    }

    #[test]
    fn duplicate_registration_keeps_first() {
        let mut machine = machine();

        let result = machine.add_state(Gait::Idle, Recording(Gait::Walk));

        assert!(matches!(result, Err(MachineError::DuplicateState { .. })));
        assert!(machine.owner().log.is_empty());

        machine.start(Gait::Idle).unwrap();
        assert_eq!(machine.owner().log, vec!["enter Idle"]);
    }

    #[test]
    fn start_enters_without_exit() {
        let mut machine = machine();
        machine.start(Gait::Idle).unwrap();

        assert_eq!(machine.current_state_id(), Some(&Gait::Idle));
        assert_eq!(machine.previous_state_id(), None);
        assert_eq!(machine.owner().log, vec!["enter Idle"]);
    }

    #[test]
    fn change_exits_before_entering() {
        let mut machine = machine();
        machine.start(Gait::Idle).unwrap();
        machine.change_state(Gait::Walk).unwrap();

        assert_eq!(
            machine.owner().log,
            vec!["enter Idle", "exit Idle", "enter Walk"]
        );
        assert_eq!(machine.previous_state_id(), Some(&Gait::Idle));
    }

    #[test]
    fn change_to_current_is_idempotent() {
        let mut machine = machine();
        machine.start(Gait::Idle).unwrap();
        machine.change_state(Gait::Walk).unwrap();
        machine.change_state(Gait::Walk).unwrap();

        assert_eq!(count(&machine, "enter Walk"), 1);
        assert_eq!(count(&machine, "exit Walk"), 0);
    }

    #[test]
    fn force_state_reenters_current() {
        let mut machine = machine();
        machine.start(Gait::Idle).unwrap();
        machine.force_state(Gait::Idle).unwrap();

        assert_eq!(
            machine.owner().log,
            vec!["enter Idle", "exit Idle", "enter Idle"]
        );
        assert_eq!(machine.previous_state_id(), Some(&Gait::Idle));
    }

    #[test]
    fn unknown_state_leaves_machine_unchanged() {
        let mut machine = StateMachine::new(Body::default());
        machine.add_state(Gait::Idle, Recording(Gait::Idle)).unwrap();
        machine.start(Gait::Idle).unwrap();

        let result = machine.change_state(Gait::Run);

        assert_eq!(
            result,
            Err(MachineError::UnknownState {
                id: "Run".to_string()
            })
        );
        assert_eq!(machine.current_state_id(), Some(&Gait::Idle));
        assert_eq!(count(&machine, "exit Idle"), 0);
    }

    #[test]
    fn tick_before_start_does_nothing() {
        let mut machine = machine();
        machine.add_any_transition(Gait::Fall, |_| true, 0);

        machine.tick(0.1);
        machine.fixed_tick(0.1);

        assert!(!machine.is_started());
        assert!(machine.owner().log.is_empty());
    }

    #[test]
    fn rules_run_before_state_tick() {
        let mut machine = machine();
        machine.add_transition(Gait::Idle, Gait::Walk, |b: &Body| b.speed > 0.0, 1);
        machine.start(Gait::Idle).unwrap();
        machine.owner_mut().speed = 2.0;

        machine.tick(0.1);

        assert_eq!(
            machine.owner().log,
            vec!["enter Idle", "exit Idle", "enter Walk", "tick Walk"]
        );
    }

    #[test]
    fn higher_priority_rule_wins() {
        let mut machine = machine();
        machine.add_transition(Gait::Idle, Gait::Walk, |_| true, 5);
        machine.add_transition(Gait::Idle, Gait::Run, |_| true, 10);
        machine.start(Gait::Idle).unwrap();

        machine.tick(0.1);

        assert_eq!(machine.current_state_id(), Some(&Gait::Run));
    }

    #[test]
    fn any_rule_beats_higher_priority_specific_rule() {
        let mut machine = machine();
        machine.add_transition(Gait::Idle, Gait::Run, |_| true, 100);
        machine.add_any_transition(Gait::Fall, |b: &Body| !b.grounded, 0);
        machine.start(Gait::Idle).unwrap();
        machine.owner_mut().grounded = false;

        machine.tick(0.1);

        assert_eq!(machine.current_state_id(), Some(&Gait::Fall));
    }

    #[test]
    fn one_rule_per_tick() {
        let mut machine = machine();
        machine.add_transition(Gait::Idle, Gait::Walk, |b: &Body| b.speed > 0.0, 1);
        machine.add_transition(Gait::Walk, Gait::Run, |b: &Body| b.speed > 5.0, 1);
        machine.start(Gait::Idle).unwrap();
        machine.owner_mut().speed = 6.0;

        machine.tick(0.1);
        assert_eq!(machine.current_state_id(), Some(&Gait::Walk));

        machine.tick(0.1);
        assert_eq!(machine.current_state_id(), Some(&Gait::Run));
    }

    #[test]
    fn fixed_tick_skips_rules() {
        let mut machine = machine();
        machine.add_transition(Gait::Idle, Gait::Walk, |_| true, 1);
        machine.start(Gait::Idle).unwrap();

        machine.fixed_tick(0.02);

        assert_eq!(machine.current_state_id(), Some(&Gait::Idle));
        assert_eq!(machine.owner().log, vec!["enter Idle", "fixed Idle"]);
        assert_eq!(machine.state_time(), 0.0);
    }

    #[test]
    fn state_time_accumulates_and_resets() {
        let mut machine = machine();
        machine.start(Gait::Idle).unwrap();

        for _ in 0..4 {
            machine.tick(0.25);
        }
        assert!((machine.state_time() - 1.0).abs() < 1e-9);

        machine.change_state(Gait::Walk).unwrap();
        assert_eq!(machine.state_time(), 0.0);
    }

    #[test]
    fn observers_receive_previous_and_current() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut machine = machine();
        let sink = Rc::clone(&seen);
        machine
            .observers_mut()
            .subscribe(move |c: &StateChange<Gait>| sink.borrow_mut().push((c.previous, c.current, c.kind)));

        machine.start(Gait::Idle).unwrap();
        machine.change_state(Gait::Walk).unwrap();
        machine.change_state(Gait::Walk).unwrap();

        assert_eq!(
            *seen.borrow(),
            vec![
                (None, Gait::Idle, ChangeKind::Start),
                (Some(Gait::Idle), Gait::Walk, ChangeKind::Change),
            ]
        );
    }

    #[test]
    fn history_records_time_spent() {
        let mut machine = machine();
        machine.start(Gait::Idle).unwrap();
        machine.tick(0.5);
        machine.change_state(Gait::Walk).unwrap();

        let last = machine.history().last().unwrap();
        assert_eq!(last.from, Some(Gait::Idle));
        assert_eq!(last.to, Gait::Walk);
        assert!((last.time_in_previous - 0.5).abs() < 1e-9);
        assert_eq!(machine.history().len(), 2);
    }

    #[test]
    fn path_is_current_name() {
        let mut machine = machine();
        assert_eq!(machine.current_state_path(), "");

        machine.start(Gait::Run).unwrap();
        assert_eq!(machine.current_state_path(), "Run");
        assert!(machine.is_in_state(&Gait::Run));
        assert!(!machine.is_in_state(&Gait::Idle));
    }

    struct Pusher;

    impl State<Gait, Body> for Pusher {
        fn enter(&mut self, _owner: &mut Body, t: &mut Transitions<Gait>) {
            t.push_state(Gait::Walk);
        }
    }

    #[test]
    fn push_requests_are_rejected() {
        let mut machine = StateMachine::new(Body::default());
        machine.add_state(Gait::Idle, Pusher).unwrap();
        machine.add_state(Gait::Walk, Recording(Gait::Walk)).unwrap();

        machine.start(Gait::Idle).unwrap();

        assert_eq!(machine.current_state_id(), Some(&Gait::Idle));
        assert_eq!(count(&machine, "enter Walk"), 0);
    }

    #[test]
    fn validate_reports_unknown_targets() {
        let mut machine = StateMachine::new(Body::default());
        machine.add_state(Gait::Idle, Recording(Gait::Idle)).unwrap();
        machine.add_transition(Gait::Idle, Gait::Run, |_| true, 0);

        let result = machine.validate();

        assert!(result.is_failure());
        if let Validation::Failure(errors) = result {
            assert!(errors
                .iter()
                .any(|e| matches!(e, DefinitionError::UnknownTarget { .. })));
        }
    }
}
