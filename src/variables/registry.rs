//! Variable type registry
//!
//! A write-through cache of variable name to type. The live Set nodes are
//! authoritative whenever one is bound to the name; the cache answers only
//! when no Set node exists or it resolves to wildcard (e.g. a type announced by
//! the backend for a name with no Set node in the graph).

use super::resolver;
use crate::nodes::{EditorGraph, TypeName};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Statistics about registry lookups
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RegistryStatistics {
    /// Lookups answered by a live, concretely resolving Set node
    pub live_hits: usize,
    /// Lookups answered from the cache
    pub cache_hits: usize,
    /// Lookups that found nothing and returned wildcard
    pub misses: usize,
    /// Cache writes
    pub writes: usize,
}

impl RegistryStatistics {
    /// Share of lookups that were answered by the live graph
    pub fn live_ratio(&self) -> f32 {
        let total = self.live_hits + self.cache_hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.live_hits as f32 / total as f32
        }
    }
}

/// What the registry knows about one variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableTypeInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: TypeName,
    /// A Set node is bound to the name, or a type has been recorded for it
    pub exists: bool,
}

#[derive(Debug, Default)]
pub struct VariableTypeRegistry {
    types: HashMap<String, TypeName>,
    stats: RegistryStatistics,
}

impl VariableTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current type of a variable
    ///
    /// Re-resolves against the live Set nodes first and caches a concrete
    /// result; falls back to the cached type, then to wildcard.
    pub fn get<G: EditorGraph + ?Sized>(&mut self, graph: &G, name: &str) -> TypeName {
        if name.is_empty() {
            return TypeName::wildcard();
        }

        if let Some(live) = resolver::resolve_variable(graph, name) {
            if live.is_concrete() {
                self.stats.live_hits += 1;
                self.set(name, live.clone());
                return live;
            }
        }

        match self.types.get(name) {
            Some(cached) => {
                self.stats.cache_hits += 1;
                cached.clone()
            }
            None => {
                self.stats.misses += 1;
                TypeName::wildcard()
            }
        }
    }

    /// Unconditionally record a type
    pub fn set(&mut self, name: impl Into<String>, type_name: TypeName) {
        let name = name.into();
        if name.is_empty() {
            return;
        }
        self.stats.writes += 1;
        if let Some(previous) = self.types.insert(name.clone(), type_name.clone()) {
            if previous != type_name {
                debug!("Variable '{}': {} -> {}", name, previous, type_name);
            }
        }
    }

    /// Cached type without consulting the graph
    pub fn cached(&self, name: &str) -> Option<&TypeName> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Drop a variable's cached type
    pub fn forget(&mut self, name: &str) -> Option<TypeName> {
        self.types.remove(name)
    }

    /// Drop every cached type and reset statistics
    pub fn clear(&mut self) {
        self.types.clear();
        self.stats = RegistryStatistics::default();
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Every cached variable type, sorted by name
    pub fn snapshot(&self) -> BTreeMap<String, TypeName> {
        self.types
            .iter()
            .map(|(name, type_name)| (name.clone(), type_name.clone()))
            .collect()
    }

    /// Type and existence of one variable
    pub fn describe<G: EditorGraph + ?Sized>(&mut self, graph: &G, name: &str) -> VariableTypeInfo {
        let exists = self.contains(name) || !resolver::set_nodes_named(graph, name).is_empty();
        VariableTypeInfo {
            name: name.to_string(),
            type_name: self.get(graph, name),
            exists,
        }
    }

    pub fn statistics(&self) -> &RegistryStatistics {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{Node, NodeGraph};

    fn image_set_graph() -> (NodeGraph, usize, usize) {
        let mut graph = NodeGraph::new();
        let mut src = Node::new(0, "LoadImage");
        src.add_output("IMAGE", TypeName::new("IMAGE"));
        let src = graph.add_node(src);
        let set = graph.add_node(Node::set_global(0, "foo"));
        graph.add_link(src, 0, set, 0).unwrap();
        (graph, src, set)
    }

    #[test]
    fn test_unbound_names_are_wildcard() {
        let graph = NodeGraph::new();
        let mut registry = VariableTypeRegistry::new();
        assert!(registry.get(&graph, "foo").is_wildcard());
        assert!(registry.get(&graph, "").is_wildcard());
        assert_eq!(registry.statistics().misses, 1);
    }

    #[test]
    fn test_live_resolution_is_cached() {
        let (graph, _, _) = image_set_graph();
        let mut registry = VariableTypeRegistry::new();
        assert_eq!(registry.get(&graph, "foo"), "IMAGE");
        assert_eq!(registry.cached("foo"), Some(&TypeName::new("IMAGE")));
        assert_eq!(registry.statistics().live_hits, 1);
    }

    #[test]
    fn test_live_graph_beats_stale_cache() {
        let (graph, _, _) = image_set_graph();
        let mut registry = VariableTypeRegistry::new();
        registry.set("foo", TypeName::new("MASK"));
        assert_eq!(registry.get(&graph, "foo"), "IMAGE");
    }

    #[test]
    fn test_wildcard_set_node_falls_back_to_cache() {
        let (mut graph, src, _) = image_set_graph();
        let mut registry = VariableTypeRegistry::new();
        assert_eq!(registry.get(&graph, "foo"), "IMAGE");

        graph.remove_node(src);
        assert_eq!(registry.get(&graph, "foo"), "IMAGE");
        assert_eq!(registry.statistics().cache_hits, 1);
    }

    #[test]
    fn test_announced_type_without_set_node() {
        let graph = NodeGraph::new();
        let mut registry = VariableTypeRegistry::new();
        registry.set("bar", TypeName::new("MASK"));
        assert_eq!(registry.get(&graph, "bar"), "MASK");
    }

    #[test]
    fn test_empty_name_is_never_written() {
        let mut registry = VariableTypeRegistry::new();
        registry.set("", TypeName::new("MASK"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_snapshot_forget_and_clear() {
        let mut registry = VariableTypeRegistry::new();
        registry.set("b", TypeName::new("INT"));
        registry.set("a", TypeName::new("FLOAT"));
        let names: Vec<_> = registry.snapshot().into_keys().collect();
        assert_eq!(names, vec!["a", "b"]);

        assert_eq!(registry.forget("a"), Some(TypeName::new("FLOAT")));
        assert_eq!(registry.len(), 1);
        registry.clear();
        assert!(registry.is_empty());
        assert_eq!(registry.statistics(), &RegistryStatistics::default());
    }

    #[test]
    fn test_describe_serializes_like_the_backend() {
        let (graph, _, _) = image_set_graph();
        let mut registry = VariableTypeRegistry::new();

        let info = registry.describe(&graph, "foo");
        assert!(info.exists);
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json, serde_json::json!({"name": "foo", "type": "IMAGE", "exists": true}));

        let missing = registry.describe(&graph, "nope");
        assert!(!missing.exists);
        assert!(missing.type_name.is_wildcard());
    }
}
