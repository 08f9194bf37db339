//! Recomputation passes over the global variable nodes
//!
//! A full pass runs in two phases: every Set node is resolved and written to
//! the registry first, then every Get node is updated from the registry. No Get
//! node ever sees a value older than the pass it belongs to.

use super::registry::VariableTypeRegistry;
use super::resolver;
use super::slots::update_slot;
use crate::constants::node::VALUE_SLOT;
use crate::nodes::{EditorGraph, NodeId, TypeName};
use crate::theme::TypeColorMap;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Outcome of one recomputation pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RecomputeReport {
    /// Named Set nodes resolved in phase 1
    pub set_nodes: usize,
    /// Named Get nodes refreshed in phase 2
    pub get_nodes: usize,
    /// Output slots whose type changed
    pub slots_changed: usize,
}

/// Push a variable's type to every Get node reading it
///
/// Returns the number of slots whose type changed.
pub fn propagate_one<G: EditorGraph + ?Sized>(
    graph: &mut G,
    colors: &TypeColorMap,
    name: &str,
    type_name: &TypeName,
) -> usize {
    resolver::get_node_ids_named(&*graph, name)
        .into_iter()
        .filter(|id| update_slot(graph, colors, *id, VALUE_SLOT, type_name))
        .count()
}

/// Full two-phase pass over all Set and Get nodes
pub fn recompute_all<G: EditorGraph + ?Sized>(
    graph: &mut G,
    registry: &mut VariableTypeRegistry,
    colors: &TypeColorMap,
) -> RecomputeReport {
    let mut report = RecomputeReport::default();
    let node_ids = graph.node_ids();

    // Phase 1: Set nodes
    let view: &G = graph;
    let resolved_sets: Vec<(NodeId, String, TypeName)> = node_ids
        .iter()
        .filter_map(|id| view.node(*id))
        .filter(|node| node.is_set_node())
        .filter_map(|node| {
            let name = node.variable_name()?.to_string();
            Some((node.id, name, resolver::resolve(view, node)))
        })
        .collect();

    // First concrete resolution per name wins
    let mut variable_types: HashMap<&str, &TypeName> = HashMap::new();
    for (_, name, type_name) in &resolved_sets {
        match variable_types.entry(name.as_str()) {
            Entry::Vacant(entry) => {
                entry.insert(type_name);
            }
            Entry::Occupied(mut entry) => {
                if entry.get().is_wildcard() && type_name.is_concrete() {
                    entry.insert(type_name);
                }
            }
        }
    }
    for (name, type_name) in variable_types {
        registry.set(name, type_name.clone());
    }

    for (id, _, type_name) in &resolved_sets {
        report.set_nodes += 1;
        if update_slot(graph, colors, *id, VALUE_SLOT, type_name) {
            report.slots_changed += 1;
        }
    }

    // Phase 2: Get nodes
    let get_nodes: Vec<(NodeId, String)> = node_ids
        .iter()
        .filter_map(|id| graph.node(*id))
        .filter(|node| node.is_get_node())
        .filter_map(|node| Some((node.id, node.variable_name()?.to_string())))
        .collect();

    for (id, name) in get_nodes {
        report.get_nodes += 1;
        let type_name = registry.cached(&name).cloned().unwrap_or_default();
        if update_slot(graph, colors, id, VALUE_SLOT, &type_name) {
            report.slots_changed += 1;
        }
    }

    report
}
