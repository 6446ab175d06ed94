//! Machine configuration.
//!
//! # Example
//!
//! ```rust
//! use tickwise::config::MachineConfig;
//!
//! let config = MachineConfig::builder()
//!     .max_transition_depth(4)
//!     .history_capacity(128)
//!     .label("player-locomotion")
//!     .build();
//!
//! assert_eq!(config.max_transition_depth, 4);
//! ```

use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_TRANSITION_DEPTH: usize = 16;
pub const DEFAULT_HISTORY_CAPACITY: usize = 64;

/// Tunables shared by flat and hierarchical machines.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// How deeply transitions requested from inside lifecycle hooks may nest
    /// before further requests are dropped.
    pub max_transition_depth: usize,

    /// Number of committed transitions kept in history. Zero disables it.
    pub history_capacity: usize,

    /// Attached to every log event emitted by the machine.
    pub label: Option<String>,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            max_transition_depth: DEFAULT_MAX_TRANSITION_DEPTH,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            label: None,
        }
    }
}

impl MachineConfig {
    pub fn builder() -> MachineConfigBuilder {
        MachineConfigBuilder::new()
    }
}

/// Fluent builder for [`MachineConfig`].
#[derive(Debug, Default)]
pub struct MachineConfigBuilder {
    config: MachineConfig,
}

impl MachineConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: MachineConfig::default(),
        }
    }

    /// Set the reentrant transition depth limit.
    pub fn max_transition_depth(mut self, depth: usize) -> Self {
        self.config.max_transition_depth = depth;
        self
    }

    /// Set how many transitions history retains.
    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.config.history_capacity = capacity;
        self
    }

    /// Disable transition history.
    pub fn without_history(self) -> Self {
        self.history_capacity(0)
    }

    /// Set the label attached to log events.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.config.label = Some(label.into());
        self
    }

    pub fn build(self) -> MachineConfig {
        self.config
    }
}
