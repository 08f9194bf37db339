//! Per-editor-session variable state
//!
//! `VariableSession` owns the registry, colors, configuration and scheduler
//! for one editor session. The host passes its graph into every call; nothing
//! is global, so a session can be reset or dropped at any time.

use super::events::{HostEvent, TypeAnnouncement};
use super::guard;
use super::propagator::{self, RecomputeReport};
use super::registry::VariableTypeRegistry;
use super::resolver;
use super::scheduler::{RefreshReason, RefreshScheduler};
use super::slots::update_slot;
use crate::config::PropagationConfig;
use crate::constants::node::{TRIGGER_INPUT, VALUE_SLOT};
use crate::error::Result;
use crate::nodes::{EditorGraph, Node, NodeId, PresentOverrides, PresentRequest, SlotSide, TypeName};
use crate::theme::TypeColorMap;
use log::{debug, info};
use std::time::Instant;

#[derive(Debug)]
pub struct VariableSession {
    registry: VariableTypeRegistry,
    colors: TypeColorMap,
    config: PropagationConfig,
    scheduler: RefreshScheduler,
}

impl VariableSession {
    pub fn new(config: PropagationConfig) -> Result<Self> {
        config.validate()?;
        let colors = TypeColorMap::with_overrides(&config.type_colors)?;
        Ok(Self {
            registry: VariableTypeRegistry::new(),
            scheduler: RefreshScheduler::from_config(&config),
            colors,
            config,
        })
    }

    pub fn registry(&self) -> &VariableTypeRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut VariableTypeRegistry {
        &mut self.registry
    }

    pub fn colors(&self) -> &TypeColorMap {
        &self.colors
    }

    pub fn config(&self) -> &PropagationConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &RefreshScheduler {
        &self.scheduler
    }

    /// Arm the start-up and periodic sweeps
    pub fn start(&mut self, now: Instant) {
        self.scheduler.start(now);
        info!(
            "Variable session started (sweep every {} ms)",
            self.config.refresh_interval_ms
        );
    }

    /// Forget all cached types and pending sweeps
    pub fn reset(&mut self) {
        self.registry.clear();
        self.scheduler.stop();
    }

    /// Run every sweep due at `now`; returns how many ran
    pub fn poll<G: EditorGraph + ?Sized>(&mut self, graph: &mut G, now: Instant) -> usize {
        let due = self.scheduler.due(now);
        for reason in &due {
            self.run_sweep(graph, *reason);
        }
        due.len()
    }

    /// Full two-phase pass
    pub fn recompute_all<G: EditorGraph + ?Sized>(&mut self, graph: &mut G) -> RecomputeReport {
        propagator::recompute_all(graph, &mut self.registry, &self.colors)
    }

    /// Push a type to every Get node reading `name`
    pub fn propagate_one<G: EditorGraph + ?Sized>(&mut self, graph: &mut G, name: &str, type_name: &TypeName) -> usize {
        propagator::propagate_one(graph, &self.colors, name, type_name)
    }

    /// Current type of a variable
    pub fn variable_type<G: EditorGraph + ?Sized>(&mut self, graph: &G, name: &str) -> TypeName {
        self.registry.get(graph, name)
    }

    /// Refresh a Set/Get node right before the host shows a menu for it
    pub fn refresh_before_present<G: EditorGraph + ?Sized>(
        &mut self,
        graph: &mut G,
        request: &PresentRequest,
    ) -> PresentOverrides {
        guard::refresh_before_present(&mut self.registry, &self.colors, graph, request)
    }

    /// React to a host notification
    pub fn handle_event<G: EditorGraph + ?Sized>(&mut self, graph: &mut G, event: HostEvent, now: Instant) {
        match event {
            HostEvent::NodeCreated(id) | HostEvent::NodeLoaded(id) => {
                if graph.node(id).is_some_and(Node::is_global_variable_node) {
                    self.scheduler.schedule_node_init(now, id);
                }
            }
            HostEvent::ConnectionsChanged {
                node,
                side,
                slot,
                connected,
            } => {
                if side != SlotSide::Input {
                    return;
                }
                let value_input_changed = graph.node(node).is_some_and(|target| {
                    target.is_set_node()
                        && target
                            .inputs
                            .get(slot)
                            .is_some_and(|input| input.name != TRIGGER_INPUT)
                });
                if value_input_changed {
                    debug!("Node {}: input {} {}", node, slot, if connected { "linked" } else { "unlinked" });
                    self.update_set_node(graph, node);
                }
            }
            HostEvent::VariableRenamed { node: id, previous } => {
                let (is_set, is_get) = graph
                    .node(id)
                    .map_or((false, false), |node| (node.is_set_node(), node.is_get_node()));
                if is_set {
                    self.update_set_node(graph, id);
                    self.purge_if_unbound(graph, &previous);
                } else if is_get {
                    self.update_get_node(graph, id);
                }
            }
            HostEvent::NodeRemoved(node) => self.on_node_removed(graph, &node),
            HostEvent::TypeAnnounced(announcement) => self.on_type_announced(graph, announcement),
            HostEvent::ExecutionCompleted => self.run_sweep(graph, RefreshReason::ExecutionCompleted),
        }
    }

    fn run_sweep<G: EditorGraph + ?Sized>(&mut self, graph: &mut G, reason: RefreshReason) {
        let report = self.recompute_all(graph);
        debug!(
            "Sweep ({:?}): {} set, {} get, {} changed",
            reason, report.set_nodes, report.get_nodes, report.slots_changed
        );
    }

    /// Targeted update after a Set node's input or name changed
    fn update_set_node<G: EditorGraph + ?Sized>(&mut self, graph: &mut G, id: NodeId) {
        let Some(node) = graph.node(id) else {
            return;
        };
        let own_type = resolver::resolve(&*graph, node);
        let name = node.variable_name().map(str::to_string);
        update_slot(graph, &self.colors, id, VALUE_SLOT, &own_type);

        let Some(name) = name else {
            return;
        };
        // Another Set node with the same name may still resolve concretely
        let type_name = resolver::resolve_variable(&*graph, &name).unwrap_or(own_type);
        self.registry.set(name.as_str(), type_name.clone());
        let changed = self.propagate_one(graph, &name, &type_name);
        debug!("Set '{}' -> {} ({} get nodes changed)", name, type_name, changed);
    }

    fn update_get_node<G: EditorGraph + ?Sized>(&mut self, graph: &mut G, id: NodeId) {
        let type_name = match graph.node(id).and_then(Node::variable_name) {
            Some(name) => {
                let name = name.to_string();
                self.registry.get(&*graph, &name)
            }
            None => TypeName::wildcard(),
        };
        update_slot(graph, &self.colors, id, VALUE_SLOT, &type_name);
    }

    fn on_node_removed<G: EditorGraph + ?Sized>(&mut self, graph: &mut G, node: &Node) {
        if !node.is_set_node() {
            return;
        }
        if let Some(name) = node.variable_name() {
            self.purge_if_unbound(graph, name);
        }
    }

    /// Forget `name` once no Set node is bound to it, when purging is enabled
    fn purge_if_unbound<G: EditorGraph + ?Sized>(&mut self, graph: &mut G, name: &str) {
        if !self.config.purge_on_set_removed || name.is_empty() {
            return;
        }
        if !resolver::set_nodes_named(&*graph, name).is_empty() {
            return;
        }
        if self.registry.forget(name).is_some() {
            info!("Variable '{}' unbound, cached type dropped", name);
            self.propagate_one(graph, name, &TypeName::wildcard());
        }
    }

    fn on_type_announced<G: EditorGraph + ?Sized>(&mut self, graph: &mut G, announcement: TypeAnnouncement) {
        let TypeAnnouncement {
            variable_name,
            type_name,
            ..
        } = announcement;
        if variable_name.is_empty() {
            return;
        }
        debug!("Backend announced '{}' = {}", variable_name, type_name);
        self.registry.set(variable_name.as_str(), type_name.clone());
        self.propagate_one(graph, &variable_name, &type_name);
    }
}

impl Default for VariableSession {
    fn default() -> Self {
        Self {
            registry: VariableTypeRegistry::new(),
            colors: TypeColorMap::new(),
            scheduler: RefreshScheduler::default(),
            config: PropagationConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::NodeGraph;
    use std::time::Duration;

    fn producer(graph: &mut NodeGraph, kind: &str) -> NodeId {
        let mut node = Node::new(0, "Producer");
        node.add_output(kind, TypeName::new(kind));
        graph.add_node(node)
    }

    fn value_type(graph: &NodeGraph, id: NodeId) -> TypeName {
        graph.nodes[&id].outputs[VALUE_SLOT].slot_type.clone()
    }

    fn renamed(node: NodeId, previous: &str) -> HostEvent {
        HostEvent::VariableRenamed {
            node,
            previous: previous.to_string(),
        }
    }

    fn purging_session() -> VariableSession {
        VariableSession::new(PropagationConfig {
            purge_on_set_removed: true,
            ..PropagationConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_connection_change_updates_gets_immediately() {
        let mut graph = NodeGraph::new();
        let mut session = VariableSession::default();
        let src = producer(&mut graph, "IMAGE");
        let set = graph.add_node(Node::set_global(0, "foo"));
        let get = graph.add_node(Node::get_global(0, "foo"));
        let now = Instant::now();

        graph.add_link(src, 0, set, 0).unwrap();
        session.handle_event(
            &mut graph,
            HostEvent::ConnectionsChanged { node: set, side: SlotSide::Input, slot: 0, connected: true },
            now,
        );
        assert_eq!(value_type(&graph, set), "IMAGE");
        assert_eq!(value_type(&graph, get), "IMAGE");
        assert_eq!(session.registry().cached("foo"), Some(&TypeName::new("IMAGE")));
    }

    #[test]
    fn test_output_side_changes_are_ignored() {
        let mut graph = NodeGraph::new();
        let mut session = VariableSession::default();
        let src = producer(&mut graph, "IMAGE");
        let set = graph.add_node(Node::set_global(0, "foo"));
        graph.add_link(src, 0, set, 0).unwrap();

        session.handle_event(
            &mut graph,
            HostEvent::ConnectionsChanged { node: set, side: SlotSide::Output, slot: 0, connected: true },
            Instant::now(),
        );
        assert!(value_type(&graph, set).is_wildcard());
        assert!(session.registry().is_empty());
    }

    #[test]
    fn test_disconnect_with_concrete_sibling_keeps_type() {
        let mut graph = NodeGraph::new();
        let mut session = VariableSession::default();
        let src = producer(&mut graph, "MASK");
        let first = graph.add_node(Node::set_global(0, "foo"));
        let second = graph.add_node(Node::set_global(0, "foo"));
        let get = graph.add_node(Node::get_global(0, "foo"));
        graph.add_link(src, 0, first, 0).unwrap();
        let link = graph.add_link(src, 0, second, 0).unwrap();
        session.recompute_all(&mut graph);

        graph.remove_link(link);
        session.handle_event(
            &mut graph,
            HostEvent::ConnectionsChanged { node: second, side: SlotSide::Input, slot: 0, connected: false },
            Instant::now(),
        );
        assert!(value_type(&graph, second).is_wildcard());
        assert_eq!(value_type(&graph, get), "MASK");
    }

    #[test]
    fn test_rename_set_node_moves_type_to_new_name() {
        let mut graph = NodeGraph::new();
        let mut session = VariableSession::default();
        let src = producer(&mut graph, "LATENT");
        let set = graph.add_node(Node::set_global(0, "foo"));
        let get_new = graph.add_node(Node::get_global(0, "renamed"));
        graph.add_link(src, 0, set, 0).unwrap();

        graph.set_widget_value(set, "variable_name", "renamed");
        session.handle_event(&mut graph, renamed(set, "foo"), Instant::now());
        assert_eq!(value_type(&graph, get_new), "LATENT");
        assert_eq!(session.registry().cached("renamed"), Some(&TypeName::new("LATENT")));
    }

    #[test]
    fn test_rename_get_node_picks_up_variable() {
        let mut graph = NodeGraph::new();
        let mut session = VariableSession::default();
        let get = graph.add_node(Node::get_global(0, "foo"));
        session.registry_mut().set("bar", TypeName::new("CLIP"));

        graph.set_widget_value(get, "variable_name", "bar");
        session.handle_event(&mut graph, renamed(get, "foo"), Instant::now());
        assert_eq!(value_type(&graph, get), "CLIP");

        graph.set_widget_value(get, "variable_name", "");
        session.handle_event(&mut graph, renamed(get, "bar"), Instant::now());
        assert!(value_type(&graph, get).is_wildcard());
    }

    #[test]
    fn test_announcement_updates_gets_without_sweep() {
        let mut graph = NodeGraph::new();
        let mut session = VariableSession::default();
        let get = graph.add_node(Node::get_global(0, "bar"));

        session.handle_event(
            &mut graph,
            HostEvent::TypeAnnounced(TypeAnnouncement::new("bar", "MASK")),
            Instant::now(),
        );
        assert_eq!(session.registry().cached("bar"), Some(&TypeName::new("MASK")));
        assert_eq!(value_type(&graph, get), "MASK");
        assert_eq!(graph.nodes[&get].outputs[VALUE_SLOT].label, "MASK");
    }

    #[test]
    fn test_announcement_with_empty_name_is_ignored() {
        let mut graph = NodeGraph::new();
        let mut session = VariableSession::default();
        session.handle_event(
            &mut graph,
            HostEvent::TypeAnnounced(TypeAnnouncement::new("", "MASK")),
            Instant::now(),
        );
        assert!(session.registry().is_empty());
    }

    #[test]
    fn test_execution_completed_runs_full_pass() {
        let mut graph = NodeGraph::new();
        let mut session = VariableSession::default();
        let src = producer(&mut graph, "VAE");
        let set = graph.add_node(Node::set_global(0, "foo"));
        let get = graph.add_node(Node::get_global(0, "foo"));
        graph.add_link(src, 0, set, 0).unwrap();

        session.handle_event(&mut graph, HostEvent::ExecutionCompleted, Instant::now());
        assert_eq!(value_type(&graph, get), "VAE");
    }

    #[test]
    fn test_created_nodes_refresh_after_delay() {
        let mut graph = NodeGraph::new();
        let mut session = VariableSession::default();
        let t0 = Instant::now();
        let src = producer(&mut graph, "MODEL");
        let set = graph.add_node(Node::set_global(0, "foo"));
        let get = graph.add_node(Node::get_global(0, "foo"));
        graph.add_link(src, 0, set, 0).unwrap();

        session.handle_event(&mut graph, HostEvent::NodeCreated(src), t0);
        session.handle_event(&mut graph, HostEvent::NodeLoaded(get), t0);
        assert_eq!(session.scheduler().pending(), 1);

        assert_eq!(session.poll(&mut graph, t0 + Duration::from_millis(50)), 0);
        assert!(value_type(&graph, get).is_wildcard());
        assert_eq!(session.poll(&mut graph, t0 + Duration::from_millis(100)), 1);
        assert_eq!(value_type(&graph, get), "MODEL");
    }

    #[test]
    fn test_removed_set_keeps_cache_by_default() {
        let mut graph = NodeGraph::new();
        let mut session = VariableSession::default();
        let src = producer(&mut graph, "IMAGE");
        let set = graph.add_node(Node::set_global(0, "foo"));
        let get = graph.add_node(Node::get_global(0, "foo"));
        graph.add_link(src, 0, set, 0).unwrap();
        session.recompute_all(&mut graph);

        let removed = graph.remove_node(set).unwrap();
        session.handle_event(&mut graph, HostEvent::NodeRemoved(removed), Instant::now());
        session.recompute_all(&mut graph);
        assert_eq!(value_type(&graph, get), "IMAGE");
    }

    #[test]
    fn test_removed_set_purges_when_configured() {
        let config = PropagationConfig {
            purge_on_set_removed: true,
            ..PropagationConfig::default()
        };
        let mut graph = NodeGraph::new();
        let mut session = VariableSession::new(config).unwrap();
        let src = producer(&mut graph, "IMAGE");
        let set = graph.add_node(Node::set_global(0, "foo"));
        let get = graph.add_node(Node::get_global(0, "foo"));
        graph.add_link(src, 0, set, 0).unwrap();
        session.recompute_all(&mut graph);

        let removed = graph.remove_node(set).unwrap();
        session.handle_event(&mut graph, HostEvent::NodeRemoved(removed), Instant::now());
        assert!(session.registry().cached("foo").is_none());
        assert!(value_type(&graph, get).is_wildcard());
    }

    #[test]
    fn test_renaming_last_set_node_purges_old_name() {
        let mut graph = NodeGraph::new();
        let mut session = purging_session();
        let src = producer(&mut graph, "IMAGE");
        let set = graph.add_node(Node::set_global(0, "foo"));
        let old_get = graph.add_node(Node::get_global(0, "foo"));
        let new_get = graph.add_node(Node::get_global(0, "bar"));
        graph.add_link(src, 0, set, 0).unwrap();
        session.recompute_all(&mut graph);

        graph.set_widget_value(set, "variable_name", "bar");
        session.handle_event(&mut graph, renamed(set, "foo"), Instant::now());
        session.recompute_all(&mut graph);
        assert!(session.registry().cached("foo").is_none());
        assert!(value_type(&graph, old_get).is_wildcard());
        assert_eq!(value_type(&graph, new_get), "IMAGE");
    }

    #[test]
    fn test_renaming_keeps_old_name_while_another_set_binds_it() {
        let mut graph = NodeGraph::new();
        let mut session = purging_session();
        let src = producer(&mut graph, "MASK");
        let moving = graph.add_node(Node::set_global(0, "foo"));
        let staying = graph.add_node(Node::set_global(0, "foo"));
        let get = graph.add_node(Node::get_global(0, "foo"));
        graph.add_link(src, 0, staying, 0).unwrap();
        session.recompute_all(&mut graph);

        graph.set_widget_value(moving, "variable_name", "bar");
        session.handle_event(&mut graph, renamed(moving, "foo"), Instant::now());
        assert_eq!(session.registry().cached("foo"), Some(&TypeName::new("MASK")));
        assert_eq!(value_type(&graph, get), "MASK");
    }

    #[test]
    fn test_renaming_without_purge_keeps_old_cache() {
        let mut graph = NodeGraph::new();
        let mut session = VariableSession::default();
        let src = producer(&mut graph, "IMAGE");
        let set = graph.add_node(Node::set_global(0, "foo"));
        graph.add_link(src, 0, set, 0).unwrap();
        session.recompute_all(&mut graph);

        graph.set_widget_value(set, "variable_name", "bar");
        session.handle_event(&mut graph, renamed(set, "foo"), Instant::now());
        assert_eq!(session.registry().cached("foo"), Some(&TypeName::new("IMAGE")));
    }

    #[test]
    fn test_trigger_input_changes_are_ignored() {
        let mut graph = NodeGraph::new();
        let mut session = VariableSession::default();
        let src = producer(&mut graph, "IMAGE");
        let mut set = Node::set_global(0, "foo");
        set.add_input(TRIGGER_INPUT, TypeName::wildcard());
        let set = graph.add_node(set);
        graph.add_link(src, 0, set, 1).unwrap();

        session.handle_event(
            &mut graph,
            HostEvent::ConnectionsChanged { node: set, side: SlotSide::Input, slot: 1, connected: true },
            Instant::now(),
        );
        assert!(session.registry().is_empty());
        assert!(graph.dirty_requests().is_empty());
    }

    #[test]
    fn test_reset_clears_state() {
        let mut session = VariableSession::default();
        session.registry_mut().set("foo", TypeName::new("INT"));
        session.start(Instant::now());
        session.reset();
        assert!(session.registry().is_empty());
        assert!(!session.scheduler().is_started());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = PropagationConfig {
            refresh_interval_ms: 0,
            ..PropagationConfig::default()
        };
        assert!(VariableSession::new(config).is_err());
    }
}
