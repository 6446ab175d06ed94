//! Definition checks that accumulate every problem instead of stopping at
//! the first one.

use crate::core::StateId;
use crate::transition::TransitionTable;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// A problem found in a machine definition.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("State '{id}' is registered more than once")]
    DuplicateState { id: String },

    #[error("Rule source '{id}' is not a registered state")]
    UnknownSource { id: String },

    #[error("Rule target '{id}' is not a registered state")]
    UnknownTarget { id: String },

    #[error("Rule '{id} -> {id}' can never fire")]
    SelfLoop { id: String },

    #[error("Initial state '{id}' is not registered")]
    UnknownInitial { id: String },
}

fn require(
    holds: bool,
    error: impl FnOnce() -> DefinitionError,
) -> Validation<(), NonEmptyVec<DefinitionError>> {
    if holds {
        Validation::success(())
    } else {
        Validation::fail(error())
    }
}

/// Check every rule in `table` (and the initial state, if given) against
/// the set of registered ids.
pub fn validate_definition<Id, O, F>(
    is_registered: F,
    table: &TransitionTable<Id, O>,
    initial: Option<&Id>,
) -> Validation<(), NonEmptyVec<DefinitionError>>
where
    Id: StateId,
    F: Fn(&Id) -> bool,
{
    let mut checks: Vec<Validation<(), NonEmptyVec<DefinitionError>>> = Vec::new();

    for rule in table.rules() {
        if let Some(from) = &rule.from {
            checks.push(require(is_registered(from), || {
                DefinitionError::UnknownSource {
                    id: from.name().to_string(),
                }
            }));
            checks.push(require(*from != rule.to, || DefinitionError::SelfLoop {
                id: from.name().to_string(),
            }));
        }
        checks.push(require(is_registered(&rule.to), || {
            DefinitionError::UnknownTarget {
                id: rule.to.name().to_string(),
            }
        }));
    }

    if let Some(initial) = initial {
        checks.push(require(is_registered(initial), || {
            DefinitionError::UnknownInitial {
                id: initial.name().to_string(),
            }
        }));
    }

    Validation::all_vec(checks).map(|_| ())
}
