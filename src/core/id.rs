//! Stable identifiers for registered states.
//!
//! Every state a machine knows about is keyed by a `StateId`. Identifiers
//! are small, comparable values (usually fieldless enums generated with
//! [`state_enum!`](crate::state_enum)) so that lookups never depend on
//! runtime type information.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::hash::Hash;

/// Identifier naming one state's logical role within a machine.
///
/// # Required Traits
///
/// - `Clone` + `Eq` + `Hash`: ids key the state registry and rule buckets
/// - `Debug`: ids appear in errors and log events
/// - `Serialize` + `Deserialize`: history records carry ids
///
/// # Example
///
/// ```rust
/// use tickwise::core::StateId;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
/// enum Locomotion {
///     Idle,
///     Walk,
///     Run,
/// }
///
/// impl StateId for Locomotion {
///     fn name(&self) -> &str {
///         match self {
///             Self::Idle => "Idle",
///             Self::Walk => "Walk",
///             Self::Run => "Run",
///         }
///     }
/// }
///
/// assert_eq!(Locomotion::Walk.name(), "Walk");
/// ```
pub trait StateId: Clone + Eq + Hash + Debug + Serialize + DeserializeOwned + 'static {
    /// Human-readable name used in paths and log events.
    fn name(&self) -> &str;
}
