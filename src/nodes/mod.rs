//! Node system - the editor graph model the variable engine works on

pub mod data_type;
pub mod graph;
pub mod hooks;
pub mod node;
pub mod port;

// Re-export core types
pub use data_type::TypeName;
pub use graph::{EditorGraph, Link, NodeGraph};
pub use hooks::{ExtensionPoints, PresentHook, PresentKind, PresentOverrides, PresentRequest};
pub use node::{Node, NodeId, Widget};
pub use port::{LinkId, Slot, SlotIndex, SlotSide};
