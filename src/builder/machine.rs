//! Builder for constructing state machines.

use crate::builder::error::BuildError;
use crate::builder::transition::TransitionBuilder;
use crate::builder::validation::{validate_definition, DefinitionError};
use crate::config::MachineConfig;
use crate::core::{Condition, State, StateId};
use crate::machine::{MachineError, StateMachine};
use crate::transition::TransitionRule;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Builder for constructing state machines with a fluent API.
///
/// `build` registers every state, checks the whole definition, and starts
/// the machine in the initial state.
pub struct StateMachineBuilder<Id: StateId, O> {
    initial: Option<Id>,
    states: Vec<(Id, Box<dyn State<Id, O>>)>,
    rules: Vec<TransitionRule<Id, O>>,
    config: MachineConfig,
}

impl<Id: StateId, O: 'static> StateMachineBuilder<Id, O> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            initial: None,
            states: Vec::new(),
            rules: Vec::new(),
            config: MachineConfig::default(),
        }
    }

    /// Set the initial state (required).
    pub fn initial(mut self, id: Id) -> Self {
        self.initial = Some(id);
        self
    }

    pub fn state<S>(mut self, id: Id, state: S) -> Self
    where
        S: State<Id, O> + 'static,
    {
        self.states.push((id, Box::new(state)));
        self
    }

    /// Add a transition using a builder.
    /// Returns an error if the builder fails validation.
    pub fn transition(mut self, builder: TransitionBuilder<Id, O>) -> Result<Self, BuildError> {
        let rule = builder.build()?;
        self.rules.push(rule);
        Ok(self)
    }

    pub fn rule<F>(mut self, from: Id, to: Id, condition: F, priority: i32) -> Self
    where
        F: Fn(&O) -> bool + 'static,
    {
        self.rules.push(TransitionRule::new(
            from,
            to,
            Condition::new(condition),
            priority,
        ));
        self
    }

    pub fn any_rule<F>(mut self, to: Id, condition: F, priority: i32) -> Self
    where
        F: Fn(&O) -> bool + 'static,
    {
        self.rules
            .push(TransitionRule::any(to, Condition::new(condition), priority));
        self
    }

    pub fn config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    /// Build and start the state machine.
    ///
    /// Every definition problem is reported at once through
    /// [`BuildError::InvalidDefinition`].
    pub fn build(self, owner: O) -> Result<StateMachine<Id, O>, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;

        if self.states.is_empty() {
            return Err(BuildError::NoStates);
        }

        let mut machine = StateMachine::with_config(owner, self.config);
        let mut checks: Vec<Validation<(), NonEmptyVec<DefinitionError>>> = Vec::new();

        for (id, state) in self.states {
            match machine.add_boxed_state(id, state) {
                Ok(()) => {}
                Err(MachineError::DuplicateState { id }) => {
                    checks.push(Validation::fail(DefinitionError::DuplicateState { id }));
                }
                Err(other) => return Err(other.into()),
            }
        }
        for rule in self.rules {
            machine.add_rule(rule);
        }

        checks.push(validate_definition(
            |id| machine.has_state(id),
            machine.transitions(),
            Some(&initial),
        ));

        if let Validation::Failure(errors) = Validation::all_vec(checks) {
            return Err(BuildError::InvalidDefinition(
                errors.iter().cloned().collect(),
            ));
        }

        machine.start(initial)?;
        Ok(machine)
    }
}

impl<Id: StateId, O: 'static> Default for StateMachineBuilder<Id, O> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Transitions;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
    enum TestId {
        Idle,
        Walk,
        Run,
    }

    impl StateId for TestId {
        fn name(&self) -> &str {
            match self {
                Self::Idle => "Idle",
                Self::Walk => "Walk",
                Self::Run => "Run",
            }
        }
    }

    #[derive(Default)]
    struct Body {
        speed: f32,
        entered: Vec<&'static str>,
    }

    struct Named(&'static str);

    impl State<TestId, Body> for Named {
        fn enter(&mut self, owner: &mut Body, _transitions: &mut Transitions<TestId>) {
            owner.entered.push(self.0);
        }
    }

    #[test]
    fn builder_requires_initial_state() {
        let result = StateMachineBuilder::<TestId, Body>::new()
            .state(TestId::Idle, Named("Idle"))
            .build(Body::default());

        assert!(matches!(result, Err(BuildError::MissingInitialState)));
    }

    #[test]
    fn builder_requires_states() {
        let result = StateMachineBuilder::<TestId, Body>::new()
            .initial(TestId::Idle)
            .build(Body::default());

        assert!(matches!(result, Err(BuildError::NoStates)));
    }

    #[test]
    fn builder_starts_machine_in_initial_state() {
        let machine = StateMachineBuilder::new()
            .state(TestId::Idle, Named("Idle"))
            .state(TestId::Walk, Named("Walk"))
            .rule(TestId::Idle, TestId::Walk, |b: &Body| b.speed > 0.1, 1)
            .initial(TestId::Idle)
            .build(Body::default())
            .unwrap();

        assert_eq!(machine.current_state_id(), Some(&TestId::Idle));
        assert_eq!(machine.owner().entered, vec!["Idle"]);
        assert_eq!(machine.transitions().len(), 1);
    }

    #[test]
    fn transition_builder_errors_propagate() {
        let result = StateMachineBuilder::<TestId, Body>::new()
            .transition(TransitionBuilder::new().from(TestId::Idle));

        assert!(matches!(result, Err(BuildError::MissingToState)));
    }

    #[test]
    fn built_rules_drive_ticks() {
        let mut machine = StateMachineBuilder::new()
            .state(TestId::Idle, Named("Idle"))
            .state(TestId::Walk, Named("Walk"))
            .transition(
                TransitionBuilder::new()
                    .from(TestId::Idle)
                    .to(TestId::Walk)
                    .when(|b: &Body| b.speed > 0.1),
            )
            .unwrap()
            .initial(TestId::Idle)
            .build(Body::default())
            .unwrap();

        machine.owner_mut().speed = 1.0;
        machine.tick(0.1);

        assert_eq!(machine.current_state_id(), Some(&TestId::Walk));
    }

    #[test]
    fn builder_reports_every_definition_problem() {
        let result = StateMachineBuilder::new()
            .state(TestId::Idle, Named("Idle"))
            .state(TestId::Idle, Named("Again"))
            .rule(TestId::Idle, TestId::Run, |_: &Body| true, 0)
            .any_rule(TestId::Run, |_: &Body| true, 0)
            .initial(TestId::Walk)
            .build(Body::default());

        match result {
            Err(BuildError::InvalidDefinition(errors)) => {
                assert_eq!(errors.len(), 4);
                assert!(errors.contains(&DefinitionError::DuplicateState {
                    id: "Idle".to_string()
                }));
                assert!(errors.contains(&DefinitionError::UnknownInitial {
                    id: "Walk".to_string()
                }));
                assert_eq!(
                    errors
                        .iter()
                        .filter(|e| matches!(e, DefinitionError::UnknownTarget { .. }))
                        .count(),
                    2
                );
            }
            other => panic!("Expected InvalidDefinition, got {:?}", other.err()),
        }
    }

    #[test]
    fn builder_applies_config() {
        let machine = StateMachineBuilder::new()
            .state(TestId::Idle, Named("Idle"))
            .initial(TestId::Idle)
            .config(MachineConfig::builder().history_capacity(2).build())
            .build(Body::default())
            .unwrap();

        assert_eq!(machine.config().history_capacity, 2);
        assert_eq!(machine.history().capacity(), 2);
    }
}
