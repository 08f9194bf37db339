//! Global variable type propagation
//!
//! Set nodes publish a variable under a name, Get nodes read it back anywhere
//! in the graph. This module keeps each Get node's output type in step with
//! whatever is wired into the matching Set node.

pub mod events;
pub mod guard;
pub mod propagator;
pub mod registry;
pub mod resolver;
pub mod scheduler;
pub mod session;
pub mod slots;

pub use events::{HostEvent, TypeAnnouncement};
pub use guard::{MenuGuard, SharedSession};
pub use propagator::RecomputeReport;
pub use registry::{RegistryStatistics, VariableTypeInfo, VariableTypeRegistry};
pub use scheduler::{RefreshReason, RefreshScheduler};
pub use session::VariableSession;
pub use slots::update_slot;
