//! Derives a variable's type from the live graph
//!
//! A Set node takes the type of whatever feeds its value input. When several
//! Set nodes share a name, they are considered in ascending node id order and
//! the first one that resolves to a concrete type wins.

use crate::constants::node::TRIGGER_INPUT;
use crate::nodes::{EditorGraph, Node, NodeId, TypeName};
use log::debug;

/// Type feeding a Set node: the first linked input (trigger excluded) whose
/// origin slot has a concrete type, wildcard otherwise
pub fn resolve<G: EditorGraph + ?Sized>(graph: &G, set_node: &Node) -> TypeName {
    for input in set_node.inputs.iter().filter(|input| input.name != TRIGGER_INPUT) {
        let Some(link_id) = input.link else {
            continue;
        };
        let Some(link) = graph.link(link_id) else {
            debug!("Node {}: skipping dangling link {}", set_node.id, link_id);
            continue;
        };
        let origin_slot = graph
            .node(link.origin_id)
            .and_then(|origin| origin.outputs.get(link.origin_slot));
        match origin_slot {
            Some(slot) if slot.slot_type.is_concrete() => return slot.slot_type.clone(),
            Some(_) => {}
            None => debug!("Node {}: link {} has no origin slot", set_node.id, link_id),
        }
    }
    TypeName::wildcard()
}

/// [`resolve`] by node id; wildcard if the node is missing
pub fn resolve_node<G: EditorGraph + ?Sized>(graph: &G, node_id: NodeId) -> TypeName {
    graph
        .node(node_id)
        .map(|node| resolve(graph, node))
        .unwrap_or_default()
}

/// All Set nodes bound to `name`, in ascending id order
pub fn set_nodes_named<'g, G: EditorGraph + ?Sized>(graph: &'g G, name: &str) -> Vec<&'g Node> {
    graph
        .node_ids()
        .into_iter()
        .filter_map(|id| graph.node(id))
        .filter(|node| node.is_set_node() && node.variable_name() == Some(name))
        .collect()
}

/// All Get nodes reading `name`, in ascending id order
pub fn get_node_ids_named<G: EditorGraph + ?Sized>(graph: &G, name: &str) -> Vec<NodeId> {
    graph
        .node_ids()
        .into_iter()
        .filter(|id| {
            graph
                .node(*id)
                .is_some_and(|node| node.is_get_node() && node.variable_name() == Some(name))
        })
        .collect()
}

/// The Set node that defines `name`: the first one resolving to a concrete
/// type, or the first one at all
pub fn find_set_node<'g, G: EditorGraph + ?Sized>(graph: &'g G, name: &str) -> Option<&'g Node> {
    let candidates = set_nodes_named(graph, name);
    candidates
        .iter()
        .copied()
        .find(|node| resolve(graph, node).is_concrete())
        .or_else(|| candidates.first().copied())
}

/// Live type of a variable across its Set nodes
///
/// `None` when no Set node is bound to `name`; otherwise the first concrete
/// resolution, or wildcard.
pub fn resolve_variable<G: EditorGraph + ?Sized>(graph: &G, name: &str) -> Option<TypeName> {
    if name.is_empty() {
        return None;
    }
    let candidates = set_nodes_named(graph, name);
    if candidates.is_empty() {
        return None;
    }
    let resolved = candidates
        .iter()
        .map(|node| resolve(graph, node))
        .find(TypeName::is_concrete)
        .unwrap_or_default();
    Some(resolved)
}
