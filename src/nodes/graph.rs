//! Node graph data structures and operations
//!
//! [`EditorGraph`] is the view of the host editor the propagation engine reads
//! and writes. [`NodeGraph`] is an in-memory implementation of it, used by the
//! command-line tool and the tests, and as a reference for host adapters.

use super::node::{Node, NodeId};
use super::port::{LinkId, SlotIndex};
use crate::error::{GlobalsError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Represents a link between an output slot and an input slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub id: LinkId,
    pub origin_id: NodeId,
    pub origin_slot: SlotIndex,
    pub target_id: NodeId,
    pub target_slot: SlotIndex,
}

impl Link {
    /// Creates a new link
    pub fn new(id: LinkId, origin_id: NodeId, origin_slot: SlotIndex, target_id: NodeId, target_slot: SlotIndex) -> Self {
        Self {
            id,
            origin_id,
            origin_slot,
            target_id,
            target_slot,
        }
    }
}

/// The host editor's graph as seen by the propagation engine
///
/// Lookups return `None` for anything missing; links may point at nodes or
/// slots that no longer exist.
pub trait EditorGraph {
    /// All node ids, in ascending order
    fn node_ids(&self) -> Vec<NodeId>;

    fn node(&self, id: NodeId) -> Option<&Node>;

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node>;

    fn link(&self, id: LinkId) -> Option<&Link>;

    /// Request a redraw of the node
    fn set_dirty_canvas(&mut self, id: NodeId);
}

/// A graph containing nodes and the links between them
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeGraph {
    pub nodes: BTreeMap<NodeId, Node>,
    pub links: BTreeMap<LinkId, Link>,
    #[serde(default)]
    next_node_id: NodeId,
    #[serde(default)]
    next_link_id: LinkId,
    /// Redraw requests since the last `take_dirty_requests`
    #[serde(skip)]
    dirty_requests: Vec<NodeId>,
}

impl NodeGraph {
    /// Creates a new empty node graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a saved graph
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut graph: NodeGraph = serde_json::from_str(json)?;
        graph.repair_id_counters()?;
        Ok(graph)
    }

    /// Loads a saved graph from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Adds a node to the graph and returns its ID
    pub fn add_node(&mut self, mut node: Node) -> NodeId {
        let id = self.next_node_id;
        node.id = id;
        self.nodes.insert(id, node);
        self.next_node_id += 1;
        id
    }

    /// Adds a node to the graph with a specific ID
    ///
    /// Fails when no id would be left for the next node.
    pub fn add_node_with_id(&mut self, id: NodeId, mut node: Node) -> Result<NodeId> {
        let next = id
            .checked_add(1)
            .filter(|next| *next < NodeId::MAX)
            .ok_or_else(|| GlobalsError::Config(format!("node id {} leaves no room for further nodes", id)))?;
        node.id = id;
        self.nodes.insert(id, node);
        self.next_node_id = self.next_node_id.max(next);
        Ok(id)
    }

    /// Removes a node and all its links
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        let attached: Vec<LinkId> = self
            .links
            .values()
            .filter(|link| link.origin_id == node_id || link.target_id == node_id)
            .map(|link| link.id)
            .collect();
        for link_id in attached {
            self.remove_link(link_id);
        }

        self.nodes.remove(&node_id)
    }

    /// Links an output slot to an input slot, replacing any link already
    /// attached to that input
    pub fn add_link(
        &mut self,
        origin_id: NodeId,
        origin_slot: SlotIndex,
        target_id: NodeId,
        target_slot: SlotIndex,
    ) -> std::result::Result<LinkId, &'static str> {
        if origin_id == target_id {
            return Err("Cannot connect a node to itself");
        }

        let origin = self.nodes.get(&origin_id).ok_or("Source node does not exist")?;
        if origin.outputs.get(origin_slot).is_none() {
            return Err("Source slot does not exist");
        }
        let target = self.nodes.get(&target_id).ok_or("Target node does not exist")?;
        let replaced = target
            .inputs
            .get(target_slot)
            .ok_or("Target slot does not exist")?
            .link;

        if let Some(old) = replaced {
            self.remove_link(old);
        }

        let id = self.next_link_id;
        self.next_link_id += 1;
        self.links.insert(id, Link::new(id, origin_id, origin_slot, target_id, target_slot));

        if let Some(slot) = self.nodes.get_mut(&origin_id).and_then(|n| n.outputs.get_mut(origin_slot)) {
            slot.links.push(id);
        }
        if let Some(slot) = self.nodes.get_mut(&target_id).and_then(|n| n.inputs.get_mut(target_slot)) {
            slot.link = Some(id);
        }
        Ok(id)
    }

    /// Removes a link and detaches it from both endpoints
    pub fn remove_link(&mut self, link_id: LinkId) -> Option<Link> {
        let link = self.links.remove(&link_id)?;

        if let Some(slot) = self.nodes.get_mut(&link.origin_id).and_then(|n| n.outputs.get_mut(link.origin_slot)) {
            slot.links.retain(|id| *id != link_id);
        }
        if let Some(slot) = self.nodes.get_mut(&link.target_id).and_then(|n| n.inputs.get_mut(link.target_slot)) {
            if slot.link == Some(link_id) {
                slot.link = None;
            }
        }
        Some(link)
    }

    /// Sets a widget value, returning false if the node or widget is missing
    pub fn set_widget_value(&mut self, node_id: NodeId, widget: &str, value: impl Into<String>) -> bool {
        match self.nodes.get_mut(&node_id).and_then(|n| n.widget_mut(widget)) {
            Some(w) => {
                w.value = value.into();
                true
            }
            None => false,
        }
    }

    /// Redraw requests recorded so far
    pub fn dirty_requests(&self) -> &[NodeId] {
        &self.dirty_requests
    }

    pub fn take_dirty_requests(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.dirty_requests)
    }

    // Saved graphs may omit the counters or carry ids at the top of the range
    fn repair_id_counters(&mut self) -> Result<()> {
        let node_floor = match self.nodes.keys().next_back() {
            Some(max) => max.checked_add(1),
            None => Some(0),
        };
        self.next_node_id = node_floor
            .map(|floor| self.next_node_id.max(floor))
            .filter(|next| *next < NodeId::MAX)
            .ok_or_else(|| GlobalsError::Config("saved graph exhausts the node id range".to_string()))?;

        let link_floor = match self.links.keys().next_back() {
            Some(max) => max.checked_add(1),
            None => Some(0),
        };
        self.next_link_id = link_floor
            .map(|floor| self.next_link_id.max(floor))
            .filter(|next| *next < LinkId::MAX)
            .ok_or_else(|| GlobalsError::Config("saved graph exhausts the link id range".to_string()))?;
        Ok(())
    }
}

impl EditorGraph for NodeGraph {
    fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.keys().copied().collect()
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(&id)
    }

    fn set_dirty_canvas(&mut self, id: NodeId) {
        self.dirty_requests.push(id);
    }
}
