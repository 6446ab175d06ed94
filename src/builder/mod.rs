//! Builder API for ergonomic state machine construction.
//!
//! This module provides fluent builders, definition validation, and the
//! `state_enum!` macro for declaring state ids with minimal boilerplate.

pub mod error;
pub mod machine;
pub mod macros;
pub mod transition;
pub mod validation;

pub use error::BuildError;
pub use machine::StateMachineBuilder;
pub use transition::TransitionBuilder;
pub use validation::{validate_definition, DefinitionError};
