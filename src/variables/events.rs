//! Notifications the host delivers to a variable session

use crate::error::Result;
use crate::nodes::{Node, NodeId, SlotIndex, SlotSide, TypeName};
use serde::{Deserialize, Serialize};

/// Type pushed by the backend after a Set node ran
///
/// Wire shape: `{"variable_name": "foo", "type": "IMAGE", "node_id": "12"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeAnnouncement {
    pub variable_name: String,
    #[serde(rename = "type")]
    pub type_name: TypeName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
}

impl TypeAnnouncement {
    pub fn new(variable_name: impl Into<String>, type_name: impl Into<TypeName>) -> Self {
        Self {
            variable_name: variable_name.into(),
            type_name: type_name.into(),
            node_id: None,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Lifecycle and graph notifications from the host editor
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// A node was placed in the graph
    NodeCreated(NodeId),
    /// A node was restored from a saved graph
    NodeLoaded(NodeId),
    /// A link was attached to or detached from one of the node's slots
    ///
    /// Changes on the trigger-only input are ignored. `connected` is kept for
    /// the host's logs; the node is re-resolved either way.
    ConnectionsChanged {
        node: NodeId,
        side: SlotSide,
        slot: SlotIndex,
        connected: bool,
    },
    /// The node's `variable_name` widget was edited; `previous` is the name
    /// it held before
    VariableRenamed { node: NodeId, previous: String },
    /// A node was deleted; carries the node as it was
    NodeRemoved(Node),
    /// The backend announced a variable type
    TypeAnnounced(TypeAnnouncement),
    /// The backend finished executing the graph
    ExecutionCompleted,
}
