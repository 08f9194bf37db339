//! Global variable type propagation for node-graph editors
//!
//! Set nodes bind whatever is wired into them to a named variable; Get nodes
//! read that variable anywhere in the graph without a visible link. This
//! library keeps every Get node's output type, label and color in step with
//! its Set node so the editor can offer type-aware connections.

pub mod config;
pub mod constants;
pub mod error;
pub mod nodes;
pub mod prompt;
pub mod theme;
pub mod variables;

// Re-export commonly used types
pub use config::PropagationConfig;
pub use error::{GlobalsError, Result};
pub use nodes::{EditorGraph, ExtensionPoints, Node, NodeGraph, NodeId, PresentKind, PresentRequest, TypeName};
pub use theme::TypeColorMap;
pub use variables::{HostEvent, MenuGuard, RecomputeReport, TypeAnnouncement, VariableSession, VariableTypeRegistry};
