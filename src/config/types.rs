use serde::{Deserialize, Serialize};

/// Runtime policy for a view store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Run the reducer against the mirror on dispatch so the UI updates
    /// before the owner has processed the action (default: true).
    #[serde(default = "default_updates_state_immediately")]
    pub updates_state_immediately: bool,
}

fn default_updates_state_immediately() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            updates_state_immediately: default_updates_state_immediately(),
        }
    }
}

impl StoreConfig {
    pub fn with_updates_state_immediately(mut self, enabled: bool) -> Self {
        self.updates_state_immediately = enabled;
        self
    }
}
