//! Library-wide constants and default values
//!
//! Centralized location for node type names, widget names and timings

/// Node type discriminators and slot layout of the global variable nodes
pub mod node {
    /// Type discriminator of the node that binds a value to a variable
    pub const SET_NODE_TYPE: &str = "SetNodeGlobal";

    /// Type discriminator of the node that reads a variable
    pub const GET_NODE_TYPE: &str = "GetNodeGlobal";

    /// Widget holding the bound variable name on both node kinds
    pub const VARIABLE_NAME_WIDGET: &str = "variable_name";

    /// Trigger-only input, never used for type resolution
    pub const TRIGGER_INPUT: &str = "_trigger";

    /// Output slot that mirrors the variable type
    pub const VALUE_SLOT: usize = 0;

    /// Set node output feeding the trigger input of Get nodes
    pub const TRIGGER_OUTPUT_SLOT: usize = 1;

    /// Name of the Set node's value input
    pub const VALUE_INPUT: &str = "value";

    /// Name of the Set node's trigger output
    pub const TRIGGER_OUTPUT: &str = "trigger";
}

/// Type names
pub mod types {
    /// The "unknown/any" marker
    pub const WILDCARD: &str = "*";

    /// Slot label shown while a slot is wildcard-typed
    pub const WILDCARD_LABEL: &str = "value";

    /// Type of the Set node's trigger output
    pub const TRIGGER_TYPE: &str = "STRING";
}

/// Refresh timing defaults (milliseconds)
pub mod timing {
    /// Periodic consistency sweep interval
    pub const REFRESH_INTERVAL_MS: u64 = 2000;

    /// Delay before the first sweep after the session starts
    pub const STARTUP_DELAY_MS: u64 = 500;

    /// Delay after a node is created or loaded before it is first refreshed
    pub const NODE_INIT_DELAY_MS: u64 = 100;

    /// Smallest interval the scheduler accepts
    pub const MIN_REFRESH_INTERVAL_MS: u64 = 1;
}
