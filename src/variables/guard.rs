//! Refresh-before-present guard
//!
//! Menus and the search box read a slot's declared type to decide what can be
//! connected. Right before one of them opens for a Set or Get node, the guard
//! re-resolves the variable and writes the fresh type onto the value slot. It
//! does no compatibility checking of its own.

use super::registry::VariableTypeRegistry;
use super::resolver;
use super::session::VariableSession;
use super::slots::update_slot;
use crate::constants::node::VALUE_SLOT;
use crate::nodes::{EditorGraph, PresentHook, PresentKind, PresentOverrides, PresentRequest};
use crate::theme::TypeColorMap;
use log::{debug, warn};
use std::cell::RefCell;
use std::rc::Rc;

/// A session shared between the editor and its registered hooks
pub type SharedSession = Rc<RefCell<VariableSession>>;

/// Refresh the node named in `request` and report the search box filter
pub fn refresh_before_present<G: EditorGraph + ?Sized>(
    registry: &mut VariableTypeRegistry,
    colors: &TypeColorMap,
    graph: &mut G,
    request: &PresentRequest,
) -> PresentOverrides {
    let Some((name, is_set)) = graph
        .node(request.node)
        .filter(|node| node.is_global_variable_node())
        .and_then(|node| Some((node.variable_name()?.to_string(), node.is_set_node())))
    else {
        return PresentOverrides::default();
    };

    let slot = match request.kind {
        PresentKind::NodeMenu => VALUE_SLOT,
        PresentKind::ConnectionMenu { slot } | PresentKind::SearchBox { slot } => slot,
    };
    // Only the value slot mirrors the variable; the Set node's trigger output keeps its type
    if slot != VALUE_SLOT {
        return PresentOverrides::default();
    }

    // A Set node shows its own input, exactly as a full pass would write it
    let type_name = if is_set {
        resolver::resolve_node(&*graph, request.node)
    } else {
        registry.get(&*graph, &name)
    };
    update_slot(graph, colors, request.node, VALUE_SLOT, &type_name);
    debug!("Node {}: '{}' refreshed to {} before {:?}", request.node, name, type_name, request.kind);

    match request.kind {
        PresentKind::SearchBox { .. } => PresentOverrides {
            type_filter: Some(type_name),
        },
        _ => PresentOverrides::default(),
    }
}

/// Hook that plugs a shared session into the editor's extension points
pub struct MenuGuard {
    session: SharedSession,
}

impl MenuGuard {
    pub fn new(session: SharedSession) -> Self {
        Self { session }
    }
}

impl<G: EditorGraph + ?Sized> PresentHook<G> for MenuGuard {
    fn before_present(&mut self, graph: &mut G, request: &PresentRequest) -> PresentOverrides {
        match self.session.try_borrow_mut() {
            Ok(mut session) => session.refresh_before_present(graph, request),
            Err(_) => {
                warn!("Variable session busy, presenting node {} without refresh", request.node);
                PresentOverrides::default()
            }
        }
    }
}
