//! Session configuration
//!
//! Loaded from JSON; every field is optional and falls back to the values in
//! [`crate::constants::timing`].

use crate::constants::timing;
use crate::error::{GlobalsError, Result};
use crate::theme::TypeColorMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropagationConfig {
    /// Periodic consistency sweep interval
    pub refresh_interval_ms: u64,
    /// Delay before the first sweep of a session
    pub startup_delay_ms: u64,
    /// Delay between a node being created or loaded and its first refresh
    pub node_init_delay_ms: u64,
    /// Forget a variable's cached type once its last Set node is removed
    pub purge_on_set_removed: bool,
    /// Extra or replacement slot colors, type name to `#RRGGBB`
    pub type_colors: BTreeMap<String, String>,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: timing::REFRESH_INTERVAL_MS,
            startup_delay_ms: timing::STARTUP_DELAY_MS,
            node_init_delay_ms: timing::NODE_INIT_DELAY_MS,
            purge_on_set_removed: false,
            type_colors: BTreeMap::new(),
        }
    }
}

impl PropagationConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: PropagationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.refresh_interval_ms < timing::MIN_REFRESH_INTERVAL_MS {
            return Err(GlobalsError::Config(format!(
                "refresh_interval_ms must be at least {}",
                timing::MIN_REFRESH_INTERVAL_MS
            )));
        }
        // Surface bad colors at load time rather than at session start
        TypeColorMap::with_overrides(&self.type_colors)?;
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn startup_delay(&self) -> Duration {
        Duration::from_millis(self.startup_delay_ms)
    }

    pub fn node_init_delay(&self) -> Duration {
        Duration::from_millis(self.node_init_delay_ms)
    }
}
