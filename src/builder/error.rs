//! Build errors for machine and transition builders.

use super::validation::DefinitionError;
use crate::machine::MachineError;
use thiserror::Error;

/// Errors that can occur when building machines and transition rules.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(id) before .build()")]
    MissingInitialState,

    #[error("No states registered. Add at least one state")]
    NoStates,

    #[error("Transition target state not specified. Call .to(id)")]
    MissingToState,

    #[error("Invalid machine definition ({} problem(s)): {}", .0.len(), summarize(.0))]
    InvalidDefinition(Vec<DefinitionError>),

    #[error(transparent)]
    Machine(#[from] MachineError),
}

fn summarize(errors: &[DefinitionError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
