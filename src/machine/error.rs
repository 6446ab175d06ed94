//! Errors reported by machine operations.
//!
//! None of these are fatal: the machine stays in its last committed state.

use thiserror::Error;

/// Recoverable conditions surfaced by machine control operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MachineError {
    #[error("State '{id}' is not registered")]
    UnknownState { id: String },

    #[error("State '{id}' is already registered; keeping the first registration")]
    DuplicateState { id: String },

    #[error("State '{id}' is already on the stack")]
    AlreadyOnStack { id: String },

    #[error("{request} requests are not supported by a flat state machine")]
    UnsupportedRequest { request: &'static str },

    #[error("Transition to '{target}' dropped: nested transition depth {depth} exceeds limit {limit}")]
    TransitionDepthExceeded {
        target: String,
        depth: usize,
        limit: usize,
    },
}
