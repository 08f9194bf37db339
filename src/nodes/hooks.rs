//! Presentation hooks for the editor's menus and search box
//!
//! The editor shows a node menu, a link-target (connection) menu and a search
//! box. Each of these is an extension point: registered hooks run first and may
//! touch the graph, then the editor's original presenter runs. Hooks wrap the
//! original behavior, they never replace it.

use super::data_type::TypeName;
use super::graph::EditorGraph;
use super::node::NodeId;
use super::port::SlotIndex;

/// Which host UI is about to be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentKind {
    /// Generic node context menu
    NodeMenu,
    /// Link-target menu opened while dragging from an output slot
    ConnectionMenu { slot: SlotIndex },
    /// Search box opened while dragging from an output slot
    SearchBox { slot: SlotIndex },
}

/// A pending presentation for one node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresentRequest {
    pub node: NodeId,
    pub kind: PresentKind,
}

impl PresentRequest {
    pub fn new(node: NodeId, kind: PresentKind) -> Self {
        Self { node, kind }
    }
}

/// Adjustments a hook asks the presenter to apply
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresentOverrides {
    /// Input type the search box should filter on
    pub type_filter: Option<TypeName>,
}

impl PresentOverrides {
    /// Later hooks win
    pub fn merge(&mut self, other: PresentOverrides) {
        if other.type_filter.is_some() {
            self.type_filter = other.type_filter;
        }
    }
}

/// Trait for code that must run right before a menu or search box is shown
pub trait PresentHook<G: EditorGraph + ?Sized> {
    fn before_present(&mut self, graph: &mut G, request: &PresentRequest) -> PresentOverrides;
}

/// The editor's registered presentation hooks
pub struct ExtensionPoints<G: EditorGraph + ?Sized> {
    hooks: Vec<Box<dyn PresentHook<G>>>,
}

impl<G: EditorGraph + ?Sized> ExtensionPoints<G> {
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Register a hook; hooks run in registration order
    pub fn register(&mut self, hook: Box<dyn PresentHook<G>>) {
        self.hooks.push(hook);
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Run every hook, then delegate to the original presenter
    pub fn present<R>(
        &mut self,
        graph: &mut G,
        request: PresentRequest,
        original: impl FnOnce(&mut G, &PresentOverrides) -> R,
    ) -> R {
        let mut overrides = PresentOverrides::default();
        for hook in &mut self.hooks {
            overrides.merge(hook.before_present(graph, &request));
        }
        original(graph, &overrides)
    }
}

impl<G: EditorGraph + ?Sized> Default for ExtensionPoints<G> {
    fn default() -> Self {
        Self::new()
    }
}
